//! Aggregation Transforms
//!
//! Pure, synchronous functions over already-fetched snapshots. No I/O here;
//! everything is deterministic given identical input, which is what makes the
//! router's behavior testable without touching the network.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use crate::error::{BotError, Result};
use crate::format::{format_pct, format_signed_pct};
use crate::model::{
    ComparisonGroup, ComparisonReport, Confidence, EntryRecommendation, PricePoint,
    RiskPreference, SentimentLabel, SentimentResult, SignalAction, SignalHorizon, TokenQuote,
    TradingSignal, YieldOpportunity,
};

/// Score above which sentiment reads bullish, below its negation bearish
const SENTIMENT_THRESHOLD: f64 = 0.3;

/// A 10% average move saturates the sentiment score at +/-1.0
const SENTIMENT_FULL_SCALE_PCT: f64 = 10.0;

/// Ranking order: APY descending, ties by TVL descending, then protocol name
fn rank_order(a: &YieldOpportunity, b: &YieldOpportunity) -> std::cmp::Ordering {
    b.apy
        .cmp(&a.apy)
        .then(b.tvl.cmp(&a.tvl))
        .then_with(|| a.protocol.cmp(&b.protocol))
}

/// Top-N opportunities by APY.
///
/// Never errors when `n` exceeds the input length; the full ranked list is
/// returned instead.
pub fn top_n(mut opportunities: Vec<YieldOpportunity>, n: usize) -> Vec<YieldOpportunity> {
    opportunities.sort_by(rank_order);
    opportunities.truncate(n);
    opportunities
}

/// Opportunities whose protocol matches `name`, case-insensitive.
///
/// An unknown protocol yields an empty vec, not an error.
pub fn filter_by_protocol(
    opportunities: &[YieldOpportunity],
    name: &str,
) -> Vec<YieldOpportunity> {
    let needle = name.trim().to_lowercase();
    opportunities
        .iter()
        .filter(|o| o.protocol == needle)
        .cloned()
        .collect()
}

/// Opportunities on a given chain, case-insensitive.
pub fn filter_by_chain(opportunities: &[YieldOpportunity], chain: &str) -> Vec<YieldOpportunity> {
    let needle = chain.trim().to_lowercase();
    opportunities
        .iter()
        .filter(|o| o.chain == needle)
        .cloned()
        .collect()
}

/// Group opportunities by subject protocol and compute per-subject max and
/// median APY.
///
/// Fails with `InsufficientSubjects` unless at least two subjects have data.
/// Groups are ordered by max APY descending so the strongest subject leads.
pub fn compare(
    opportunities: &[YieldOpportunity],
    subjects: &[String],
) -> Result<ComparisonReport> {
    let mut normalized: Vec<String> = Vec::new();
    for subject in subjects {
        let s = subject.trim().to_lowercase();
        if !s.is_empty() && !normalized.contains(&s) {
            normalized.push(s);
        }
    }

    if normalized.len() < 2 {
        return Err(BotError::InsufficientSubjects {
            available: normalized.len(),
            needed: 2,
        });
    }

    let mut groups: Vec<ComparisonGroup> = Vec::new();
    for subject in &normalized {
        let rows = top_n(filter_by_protocol(opportunities, subject), usize::MAX);
        if rows.is_empty() {
            continue;
        }
        let max_apy = rows.iter().map(|o| o.apy).max().unwrap_or(Decimal::ZERO);
        let median_apy = median(rows.iter().map(|o| o.apy).collect());
        groups.push(ComparisonGroup {
            subject: subject.clone(),
            max_apy,
            median_apy,
            rows,
        });
    }

    if groups.len() < 2 {
        return Err(BotError::InsufficientSubjects {
            available: groups.len(),
            needed: 2,
        });
    }

    groups.sort_by(|a, b| b.max_apy.cmp(&a.max_apy));

    Ok(ComparisonReport {
        subjects: normalized,
        groups,
    })
}

fn median(mut values: Vec<Decimal>) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.sort();
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / dec!(2)
    }
}

/// Map an average percent change onto the [-1, 1] sentiment scale
fn score_from_pct(avg_change_pct: f64) -> f64 {
    (avg_change_pct / SENTIMENT_FULL_SCALE_PCT).clamp(-1.0, 1.0)
}

fn label_from_score(score: f64) -> SentimentLabel {
    if score > SENTIMENT_THRESHOLD {
        SentimentLabel::Bullish
    } else if score < -SENTIMENT_THRESHOLD {
        SentimentLabel::Bearish
    } else {
        SentimentLabel::Neutral
    }
}

/// Market-wide sentiment over a basket of quotes.
///
/// The score is the mean 24h change across the basket, scaled so a 10%
/// average move saturates at +/-1.0. Monotonic: raising any quote's 24h
/// change never lowers the score.
pub fn score_sentiment(quotes: &[TokenQuote]) -> SentimentResult {
    if quotes.is_empty() {
        return SentimentResult {
            subject: "market".into(),
            score: 0.0,
            label: SentimentLabel::Neutral,
            basis: Vec::new(),
        };
    }

    let sum: Decimal = quotes.iter().map(|q| q.change_24h_pct).sum();
    let avg = sum / Decimal::from(quotes.len());
    let score = score_from_pct(avg.to_f64().unwrap_or(0.0));

    let basis = quotes
        .iter()
        .map(|q| format!("{} {} (24h)", q.symbol, format_signed_pct(q.change_24h_pct)))
        .collect();

    SentimentResult {
        subject: "market".into(),
        score,
        label: label_from_score(score),
        basis,
    }
}

/// Sentiment for one symbol from its recent price series.
///
/// Recent moves weigh more: 24h at 0.5, 7d at 0.3, 30d at 0.2. Windows the
/// series is too short to cover are skipped and the remaining weights
/// renormalized.
pub fn score_series_sentiment(subject: &str, series: &[PricePoint]) -> SentimentResult {
    let windows: [(i64, f64, &str); 3] = [(1, 0.5, "24h"), (7, 0.3, "7d"), (30, 0.2, "30d")];

    let mut weighted = 0.0;
    let mut weight_total = 0.0;
    let mut basis = Vec::new();

    for (days, weight, name) in windows {
        if let Some(change) = change_over(series, days) {
            let pct = change.to_f64().unwrap_or(0.0);
            weighted += pct * weight;
            weight_total += weight;
            basis.push(format!("{} over {name}", format_signed_pct(change)));
        }
    }

    let score = if weight_total > 0.0 {
        score_from_pct(weighted / weight_total)
    } else {
        0.0
    };

    SentimentResult {
        subject: subject.to_lowercase(),
        score,
        label: label_from_score(score),
        basis,
    }
}

/// Percent change from the observation closest to `days` ago to the latest.
///
/// Returns `None` when the series does not reach back far enough to make the
/// window meaningful (no point at least `days` old).
pub fn change_over(series: &[PricePoint], days: i64) -> Option<Decimal> {
    let latest = series.iter().max_by_key(|p| p.timestamp)?;
    let cutoff = latest.timestamp - chrono::Duration::days(days);

    let reference = series
        .iter()
        .filter(|p| p.timestamp <= cutoff)
        .max_by_key(|p| p.timestamp)?;

    if reference.price <= Decimal::ZERO {
        return None;
    }
    Some((latest.price - reference.price) / reference.price * dec!(100))
}

/// Derive threshold-based trading signals from a price series.
///
/// Always returns at least one signal; a quiet tape yields a single neutral
/// entry rather than an empty list.
pub fn derive_signals(series: &[PricePoint]) -> Vec<TradingSignal> {
    let change_24h = change_over(series, 1);
    let change_7d = change_over(series, 7);
    let change_30d = change_over(series, 30);

    let mut signals = Vec::new();

    if let Some(c) = change_24h {
        let action = if c > dec!(5) {
            Some(SignalAction::StrongBuy)
        } else if c > dec!(2) {
            Some(SignalAction::Buy)
        } else if c < dec!(-5) {
            Some(SignalAction::StrongSell)
        } else if c < dec!(-2) {
            Some(SignalAction::Sell)
        } else {
            None
        };
        if let Some(action) = action {
            let direction = if c > Decimal::ZERO { "up" } else { "down" };
            signals.push(TradingSignal {
                horizon: SignalHorizon::ShortTerm,
                action,
                reason: format!(
                    "Price {direction} {} in the last 24 hours",
                    format_pct(c.abs())
                ),
            });
        }
    }

    if let (Some(c7), Some(c24)) = (change_7d, change_24h) {
        if c7 > Decimal::ZERO && c24 < Decimal::ZERO {
            signals.push(TradingSignal {
                horizon: SignalHorizon::MediumTerm,
                action: SignalAction::BuyDip,
                reason: format!(
                    "Positive 7-day trend ({}) with a recent dip ({})",
                    format_signed_pct(c7),
                    format_signed_pct(c24)
                ),
            });
        } else if c7 < Decimal::ZERO && c24 > Decimal::ZERO {
            signals.push(TradingSignal {
                horizon: SignalHorizon::MediumTerm,
                action: SignalAction::SellRally,
                reason: format!(
                    "Negative 7-day trend ({}) with a recent rally ({})",
                    format_signed_pct(c7),
                    format_signed_pct(c24)
                ),
            });
        }
    }

    if let Some(c30) = change_30d {
        if c30 > dec!(20) {
            signals.push(TradingSignal {
                horizon: SignalHorizon::LongTerm,
                action: SignalAction::TakeProfit,
                reason: format!(
                    "Price up {} in 30 days, consider taking profits",
                    format_pct(c30)
                ),
            });
        } else if c30 < dec!(-20) {
            signals.push(TradingSignal {
                horizon: SignalHorizon::LongTerm,
                action: SignalAction::Accumulate,
                reason: format!(
                    "Price down {} in 30 days, potential accumulation zone",
                    format_pct(c30.abs())
                ),
            });
        }
    }

    if signals.is_empty() {
        signals.push(TradingSignal {
            horizon: SignalHorizon::General,
            action: SignalAction::Neutral,
            reason: "No clear trading signals at this time".into(),
        });
    }

    signals
}

/// Filter opportunities down to the preference's risk tags, then rank.
pub fn recommend(
    opportunities: Vec<YieldOpportunity>,
    preference: RiskPreference,
    limit: usize,
) -> Vec<YieldOpportunity> {
    let allowed = preference.allowed_tags();
    let matching = opportunities
        .into_iter()
        .filter(|o| allowed.contains(&o.risk_tag))
        .collect();
    top_n(matching, limit)
}

/// Combine sentiment and trading signals into a yield-entry recommendation.
pub fn entry_recommendation(
    subject: &str,
    sentiment: &SentimentResult,
    signals: &[TradingSignal],
) -> EntryRecommendation {
    let mut rec = EntryRecommendation {
        subject: subject.to_lowercase(),
        enter_now: false,
        confidence: Confidence::Low,
        reasoning: Vec::new(),
    };

    if signals.iter().any(|s| s.action.is_entry_signal()) {
        rec.enter_now = true;
        rec.confidence = Confidence::Medium;
        rec.reasoning
            .push("Positive short or medium-term signals detected".into());
    }

    if signals.iter().any(|s| s.action == SignalAction::Accumulate) {
        rec.enter_now = true;
        rec.confidence = Confidence::High;
        rec.reasoning
            .push("Price is in an accumulation zone, favorable for yield positions".into());
    }

    match sentiment.label {
        SentimentLabel::Bullish => {
            if rec.enter_now {
                rec.confidence = Confidence::High;
            }
            rec.reasoning.push("Overall sentiment is bullish".into());
        }
        SentimentLabel::Bearish => {
            rec.enter_now = false;
            rec.confidence = Confidence::High;
            rec.reasoning
                .push("Overall sentiment is bearish, consider waiting".into());
        }
        SentimentLabel::Neutral => {}
    }

    if rec.reasoning.is_empty() {
        rec.reasoning
            .push("No strong signals in either direction".into());
    }

    rec
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn opp(protocol: &str, chain: &str, apy: Decimal, tvl: Decimal) -> YieldOpportunity {
        YieldOpportunity::new(protocol, chain, "POOL", apy, tvl)
    }

    fn series_from_changes(daily_pcts: &[f64]) -> Vec<PricePoint> {
        // Builds a series ending today from a list of day-over-day changes
        let now = Utc::now();
        let mut price = dec!(100);
        let mut points = Vec::new();
        for (i, pct) in daily_pcts.iter().enumerate() {
            let age = daily_pcts.len() - 1 - i;
            price = price * (Decimal::ONE + Decimal::try_from(*pct).unwrap() / dec!(100));
            points.push(PricePoint {
                timestamp: now - Duration::days(age as i64),
                price,
            });
        }
        points
    }

    #[test]
    fn test_top_n_tie_break() {
        // APYs [12, 45, 3, 45, 20] with TVLs [100, 200, 100, 150, 100]
        let opps = vec![
            opp("a", "eth", dec!(12), dec!(100)),
            opp("b", "eth", dec!(45), dec!(200)),
            opp("c", "eth", dec!(3), dec!(100)),
            opp("d", "eth", dec!(45), dec!(150)),
            opp("e", "eth", dec!(20), dec!(100)),
        ];

        let top = top_n(opps, 3);
        assert_eq!(top.len(), 3);
        assert_eq!((top[0].apy, top[0].tvl), (dec!(45), dec!(200)));
        assert_eq!((top[1].apy, top[1].tvl), (dec!(45), dec!(150)));
        assert_eq!(top[2].apy, dec!(20));
    }

    #[test]
    fn test_top_n_oversized_returns_full_sort() {
        let opps = vec![
            opp("a", "eth", dec!(1), dec!(1)),
            opp("b", "eth", dec!(2), dec!(1)),
        ];
        let top = top_n(opps, 100);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].apy, dec!(2));
    }

    #[test]
    fn test_top_n_idempotent() {
        let opps = vec![
            opp("a", "eth", dec!(5), dec!(10)),
            opp("b", "eth", dec!(9), dec!(20)),
            opp("c", "eth", dec!(9), dec!(30)),
        ];
        let once = top_n(opps, 10);
        let twice = top_n(once.clone(), 10);
        assert_eq!(
            once.iter().map(|o| &o.protocol).collect::<Vec<_>>(),
            twice.iter().map(|o| &o.protocol).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_filter_by_protocol_case_insensitive() {
        let opps = vec![
            opp("Aave", "eth", dec!(5), dec!(10)),
            opp("compound", "eth", dec!(6), dec!(10)),
        ];
        let hits = filter_by_protocol(&opps, "AAVE");
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|o| o.protocol == "aave"));
    }

    #[test]
    fn test_filter_unknown_is_empty_not_error() {
        let opps = vec![opp("aave", "eth", dec!(5), dec!(10))];
        assert!(filter_by_protocol(&opps, "nosuchprotocol").is_empty());
        assert!(filter_by_chain(&opps, "unknownchain").is_empty());
    }

    #[test]
    fn test_compare_single_subject_fails() {
        let opps = vec![opp("aave", "eth", dec!(5), dec!(10))];
        let err = compare(&opps, &["aave".into()]).unwrap_err();
        assert!(matches!(err, BotError::InsufficientSubjects { .. }));
    }

    #[test]
    fn test_compare_two_subjects_with_data() {
        let opps = vec![
            opp("aave", "eth", dec!(5), dec!(10)),
            opp("aave", "eth", dec!(7), dec!(10)),
            opp("aave", "eth", dec!(9), dec!(10)),
            opp("compound", "eth", dec!(6), dec!(10)),
        ];
        let report = compare(&opps, &["aave".into(), "compound".into()]).unwrap();
        assert_eq!(report.groups.len(), 2);

        // aave leads on max APY, median of [5, 7, 9] is 7
        assert_eq!(report.groups[0].subject, "aave");
        assert_eq!(report.groups[0].max_apy, dec!(9));
        assert_eq!(report.groups[0].median_apy, dec!(7));
    }

    #[test]
    fn test_compare_subject_without_data_fails() {
        let opps = vec![opp("aave", "eth", dec!(5), dec!(10))];
        let err = compare(&opps, &["aave".into(), "ghost".into()]).unwrap_err();
        assert_eq!(
            err,
            BotError::InsufficientSubjects {
                available: 1,
                needed: 2
            }
        );
    }

    #[test]
    fn test_sentiment_thresholds() {
        let bullish = vec![
            TokenQuote::new("BTC", dec!(97000), dec!(6)),
            TokenQuote::new("ETH", dec!(3400), dec!(4)),
        ];
        assert_eq!(score_sentiment(&bullish).label, SentimentLabel::Bullish);

        let bearish = vec![TokenQuote::new("BTC", dec!(97000), dec!(-8))];
        assert_eq!(score_sentiment(&bearish).label, SentimentLabel::Bearish);

        let flat = vec![TokenQuote::new("BTC", dec!(97000), dec!(0.5))];
        let result = score_sentiment(&flat);
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.subject, "market");
        assert_eq!(result.basis.len(), 1);
    }

    #[test]
    fn test_sentiment_monotonic() {
        let low = vec![
            TokenQuote::new("BTC", dec!(97000), dec!(1)),
            TokenQuote::new("ETH", dec!(3400), dec!(-2)),
        ];
        let mut high = low.clone();
        high[1].change_24h_pct = dec!(3);
        assert!(score_sentiment(&high).score >= score_sentiment(&low).score);
    }

    #[test]
    fn test_sentiment_score_saturates() {
        let moon = vec![TokenQuote::new("DOGE", dec!(0.4), dec!(400))];
        assert!((score_sentiment(&moon).score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_change_over_short_series() {
        let series = series_from_changes(&[1.0, 1.0]);
        assert!(change_over(&series, 1).is_some());
        assert!(change_over(&series, 30).is_none());
    }

    #[test]
    fn test_signals_strong_buy() {
        // Quiet month, then a 6% pop in the final day
        let mut changes = vec![0.0; 31];
        changes[30] = 6.0;
        let signals = derive_signals(&series_from_changes(&changes));
        assert!(signals
            .iter()
            .any(|s| s.action == SignalAction::StrongBuy && s.horizon == SignalHorizon::ShortTerm));
    }

    #[test]
    fn test_signals_buy_dip() {
        // Strong week, small pullback on the last day
        let mut changes = vec![0.0; 31];
        for c in changes.iter_mut().skip(24).take(6) {
            *c = 2.0;
        }
        changes[30] = -1.0;
        let signals = derive_signals(&series_from_changes(&changes));
        assert!(signals.iter().any(|s| s.action == SignalAction::BuyDip));
    }

    #[test]
    fn test_signals_quiet_tape_is_neutral() {
        let signals = derive_signals(&series_from_changes(&[0.1; 31]));
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].action, SignalAction::Neutral);
    }

    #[test]
    fn test_recommend_stable_excludes_high_risk() {
        let opps = vec![
            opp("aave", "eth", dec!(4), dec!(50_000_000)),
            opp("degenfarm", "bsc", dec!(900), dec!(50_000)),
        ];
        let picks = recommend(opps, RiskPreference::Stable, 10);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].protocol, "aave");
    }

    #[test]
    fn test_entry_bearish_sentiment_overrides_signals() {
        let sentiment = SentimentResult {
            subject: "eth".into(),
            score: -0.6,
            label: SentimentLabel::Bearish,
            basis: vec![],
        };
        let signals = vec![TradingSignal {
            horizon: SignalHorizon::ShortTerm,
            action: SignalAction::Buy,
            reason: "up".into(),
        }];
        let rec = entry_recommendation("ETH", &sentiment, &signals);
        assert!(!rec.enter_now);
        assert_eq!(rec.confidence, Confidence::High);
    }

    #[test]
    fn test_entry_accumulation_high_confidence() {
        let sentiment = SentimentResult {
            subject: "eth".into(),
            score: 0.0,
            label: SentimentLabel::Neutral,
            basis: vec![],
        };
        let signals = vec![TradingSignal {
            horizon: SignalHorizon::LongTerm,
            action: SignalAction::Accumulate,
            reason: "down 25% in 30d".into(),
        }];
        let rec = entry_recommendation("ETH", &sentiment, &signals);
        assert!(rec.enter_now);
        assert_eq!(rec.confidence, Confidence::High);
    }
}
