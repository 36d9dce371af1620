//! Reply Rendering
//!
//! Fixed-layout markdown replies. Rendering is pure string work; anything
//! over the platform-style cap is truncated with an ellipsis, and degraded
//! narratives are annotated rather than hidden.

use yieldbot_core::format::{format_pct, format_signed_pct, format_usd, truncate_with_ellipsis};
use yieldbot_core::{
    BotError, ComparisonReport, EntryRecommendation, SentimentResult, TokenQuote, TradingSignal,
    YieldOpportunity,
};
use yieldbot_insight::Insight;

use crate::command::COMMAND_TABLE;

/// Cap on rendered reply size
pub const MAX_REPLY_CHARS: usize = 4000;

/// A rendered reply ready for the chat-platform adapter
#[derive(Clone, Debug)]
pub struct Reply {
    pub text: String,
    /// True when the narrative portion used the template fallback
    pub degraded: bool,
}

impl Reply {
    pub(crate) fn new(text: String, degraded: bool) -> Self {
        Self {
            text: truncate_with_ellipsis(&text, MAX_REPLY_CHARS),
            degraded,
        }
    }

    /// Render an error as its single user-facing message
    pub(crate) fn from_error(error: &BotError) -> Self {
        Self::new(error.user_message(), false)
    }
}

pub(crate) fn render_welcome() -> Reply {
    Reply::new(
        "Welcome to the DeFi Yield Finder Bot.\n\n\
         I can help you find the best yield opportunities in DeFi and provide \
         market insights.\n\nSend 'help' to see all available commands."
            .into(),
        false,
    )
}

pub(crate) fn render_help() -> Reply {
    let mut text = String::from("**Available Commands:**\n\n");
    for (verb, description) in COMMAND_TABLE {
        text.push_str(&format!("{verb} - {description}\n"));
    }
    Reply::new(text, false)
}

fn push_opportunity(text: &mut String, index: usize, opp: &YieldOpportunity) {
    text.push_str(&format!(
        "{}. **{} on {}** ({})\n   APY: {} | TVL: {} | Risk: {}\n",
        index + 1,
        opp.protocol,
        opp.chain,
        opp.asset,
        format_pct(opp.apy),
        format_usd(opp.tvl),
        opp.risk_tag
    ));
}

fn push_narrative(text: &mut String, insight: &Insight) {
    text.push_str("\n**Analysis**\n");
    text.push_str(&insight.text);
    text.push('\n');
    if insight.degraded {
        text.push_str("_(AI narrative unavailable - showing data summary)_\n");
    }
}

fn push_dropped_note(text: &mut String, dropped: usize) {
    if dropped > 0 {
        text.push_str(&format!(
            "\n_{dropped} upstream record(s) were malformed and skipped._\n"
        ));
    }
}

pub(crate) fn render_yield_list(
    title: &str,
    opportunities: &[YieldOpportunity],
    dropped: usize,
    insight: Option<&Insight>,
) -> Reply {
    let mut text = format!("**{title}**\n\n");
    for (i, opp) in opportunities.iter().enumerate() {
        push_opportunity(&mut text, i, opp);
    }
    if let Some(insight) = insight {
        push_narrative(&mut text, insight);
    }
    push_dropped_note(&mut text, dropped);

    Reply::new(text, insight.is_some_and(|i| i.degraded))
}

pub(crate) fn render_comparison(report: &ComparisonReport, insight: &Insight) -> Reply {
    let mut text = String::from("**Yield Comparison**\n\n");
    for group in &report.groups {
        text.push_str(&format!(
            "**{}** - max APY {}, median APY {} ({} pools)\n",
            group.subject,
            format_pct(group.max_apy),
            format_pct(group.median_apy),
            group.rows.len()
        ));
        for (i, row) in group.rows.iter().take(3).enumerate() {
            push_opportunity(&mut text, i, row);
        }
        text.push('\n');
    }
    push_narrative(&mut text, insight);

    Reply::new(text, insight.degraded)
}

pub(crate) fn render_quote(quote: &TokenQuote) -> Reply {
    let text = format!(
        "**{} Price**\n\nCurrent Price: {}\n24h Change: {}\n",
        quote.symbol,
        format_usd(quote.price_usd),
        format_signed_pct(quote.change_24h_pct)
    );
    Reply::new(text, false)
}

pub(crate) fn render_market_sentiment(
    sentiment: &SentimentResult,
    quotes: &[TokenQuote],
    dropped: usize,
    insight: &Insight,
) -> Reply {
    let mut text = format!(
        "**Market Sentiment**\n\nOverall: {} (score {:.2})\n\n",
        sentiment.label, sentiment.score
    );

    let mut by_change: Vec<&TokenQuote> = quotes.iter().collect();
    by_change.sort_by(|a, b| b.change_24h_pct.cmp(&a.change_24h_pct));

    text.push_str("**Top Gainers:**\n");
    for quote in by_change.iter().take(3) {
        text.push_str(&format!(
            "- {}: {}\n",
            quote.symbol,
            format_signed_pct(quote.change_24h_pct)
        ));
    }
    text.push_str("\n**Top Losers:**\n");
    for quote in by_change.iter().rev().take(3) {
        text.push_str(&format!(
            "- {}: {}\n",
            quote.symbol,
            format_signed_pct(quote.change_24h_pct)
        ));
    }

    push_narrative(&mut text, insight);
    push_dropped_note(&mut text, dropped);

    Reply::new(text, insight.degraded)
}

pub(crate) fn render_token_sentiment(
    sentiment: &SentimentResult,
    quote: Option<&TokenQuote>,
    insight: &Insight,
    dropped: usize,
) -> Reply {
    let mut text = format!(
        "**{} Sentiment**\n\nSentiment: {} (score {:.2})\n",
        sentiment.subject, sentiment.label, sentiment.score
    );
    if let Some(quote) = quote {
        text.push_str(&format!("Current Price: {}\n", format_usd(quote.price_usd)));
    }
    if !sentiment.basis.is_empty() {
        text.push_str("\n**Price Changes:**\n");
        for line in &sentiment.basis {
            text.push_str(&format!("- {line}\n"));
        }
    }
    push_narrative(&mut text, insight);
    push_dropped_note(&mut text, dropped);

    Reply::new(text, insight.degraded)
}

pub(crate) fn render_signals(
    subject: &str,
    quote: Option<&TokenQuote>,
    signals: &[TradingSignal],
    dropped: usize,
) -> Reply {
    let mut text = format!("**{subject} Trading Signals**\n\n");
    if let Some(quote) = quote {
        text.push_str(&format!(
            "Current Price: {}\n\n",
            format_usd(quote.price_usd)
        ));
    }
    text.push_str("**Signals:**\n");
    for signal in signals {
        text.push_str(&format!(
            "- {}: {}\n  Reason: {}\n",
            signal.horizon, signal.action, signal.reason
        ));
    }
    push_dropped_note(&mut text, dropped);
    Reply::new(text, false)
}

pub(crate) fn render_entry(
    recommendation: &EntryRecommendation,
    quote: Option<&TokenQuote>,
    insight: &Insight,
    dropped: usize,
) -> Reply {
    let mut text = format!("**{} Yield Entry Recommendation**\n\n", recommendation.subject);
    if let Some(quote) = quote {
        text.push_str(&format!("Current Price: {}\n", format_usd(quote.price_usd)));
    }
    text.push_str(&format!(
        "Recommendation: {}\nConfidence: {}\n\n**Reasoning:**\n",
        if recommendation.enter_now {
            "Enter now"
        } else {
            "Wait"
        },
        recommendation.confidence
    ));
    for reason in &recommendation.reasoning {
        text.push_str(&format!("- {reason}\n"));
    }
    push_narrative(&mut text, insight);
    push_dropped_note(&mut text, dropped);

    Reply::new(text, insight.degraded)
}
