//! Display Formatting
//!
//! Reply-side helpers for rendering money and percentages. Kept here so the
//! router and the composer fallback templates print numbers identically.

use rust_decimal::Decimal;

/// Format a USD amount with thousands separators, e.g. `$1,234,567.89`
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let raw = format!("{rounded:.2}");
    let (number, negative) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw.as_str(), false),
    };
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

/// Format a percentage value, e.g. `4.25%`
pub fn format_pct(value: Decimal) -> String {
    format!("{:.2}%", value.round_dp(2))
}

/// Format a percentage with an explicit sign, e.g. `+4.25%` / `-1.10%`
pub fn format_signed_pct(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    if rounded.is_sign_negative() {
        format!("{rounded:.2}%")
    } else {
        format!("+{rounded:.2}%")
    }
}

/// Truncate on a char boundary and append an ellipsis when over `max` chars
pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_usd_grouping() {
        assert_eq!(format_usd(dec!(1234567.891)), "$1,234,567.89");
        assert_eq!(format_usd(dec!(42)), "$42.00");
        assert_eq!(format_usd(dec!(-950.5)), "-$950.50");
    }

    #[test]
    fn test_format_signed_pct() {
        assert_eq!(format_signed_pct(dec!(4.256)), "+4.26%");
        assert_eq!(format_signed_pct(dec!(-1.1)), "-1.10%");
        assert_eq!(format_signed_pct(dec!(0)), "+0.00%");
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        let long = "a".repeat(20);
        let cut = truncate_with_ellipsis(&long, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with("..."));
    }
}
