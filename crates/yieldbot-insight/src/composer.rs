//! Insight Composer
//!
//! Builds a bounded prompt from aggregated data, makes one generation
//! attempt, and falls back to a deterministic template when the attempt
//! fails. Callers never see an error from this path - only a reply whose
//! `degraded` flag tells the router to annotate it.

use std::sync::Arc;

use yieldbot_core::format::{format_pct, format_signed_pct, format_usd};
use yieldbot_core::{
    ComparisonReport, EntryRecommendation, RiskTag, SentimentResult, TokenQuote, TradingSignal,
    YieldOpportunity,
};

use crate::provider::TextGenerator;

/// Hard cap on serialized payload characters inside a prompt
pub const PAYLOAD_BUDGET_CHARS: usize = 2000;

/// System prompt shared by every insight kind
const SYSTEM_PROMPT: &str = "You are a helpful assistant specializing in DeFi, cryptocurrency \
trading, and yield farming. Provide concise, accurate information and analysis.";

/// The kinds of narrative insight the composer can produce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsightKind {
    YieldAnalysis,
    TradingInsight,
    ComparisonExplanation,
    SentimentSummary,
    EntryExplanation,
}

/// Aggregated data feeding one insight
#[derive(Clone, Debug)]
pub enum InsightPayload {
    YieldAnalysis(YieldOpportunity),
    TradingInsight {
        quote: Option<TokenQuote>,
        sentiment: SentimentResult,
        signals: Vec<TradingSignal>,
    },
    ComparisonExplanation(ComparisonReport),
    SentimentSummary(SentimentResult),
    EntryExplanation {
        recommendation: EntryRecommendation,
        quote: Option<TokenQuote>,
    },
}

/// A composed narrative plus the degradation flag
#[derive(Clone, Debug)]
pub struct Insight {
    pub text: String,
    /// True when the template fallback was used instead of generated text
    pub degraded: bool,
}

impl InsightPayload {
    pub fn kind(&self) -> InsightKind {
        match self {
            Self::YieldAnalysis(_) => InsightKind::YieldAnalysis,
            Self::TradingInsight { .. } => InsightKind::TradingInsight,
            Self::ComparisonExplanation(_) => InsightKind::ComparisonExplanation,
            Self::SentimentSummary(_) => InsightKind::SentimentSummary,
            Self::EntryExplanation { .. } => InsightKind::EntryExplanation,
        }
    }

    /// Headline lines always survive the budget; detail lines are appended
    /// in priority order and dropped from the end when over budget.
    fn payload_lines(&self) -> (Vec<String>, Vec<String>) {
        match self {
            Self::YieldAnalysis(opp) => {
                let headline = vec![
                    format!("Protocol: {}", opp.protocol),
                    format!("Chain: {}", opp.chain),
                    format!("Pool: {}", opp.asset),
                    format!("APY: {}", format_pct(opp.apy)),
                    format!("TVL: {}", format_usd(opp.tvl)),
                    format!("Risk: {}", opp.risk_tag),
                ];
                (headline, Vec::new())
            }
            Self::TradingInsight {
                quote,
                sentiment,
                signals,
            } => {
                let mut headline = vec![format!("Token: {}", sentiment.subject)];
                if let Some(quote) = quote {
                    headline.push(format!("Current price: {}", format_usd(quote.price_usd)));
                    headline.push(format!(
                        "24h change: {}",
                        format_signed_pct(quote.change_24h_pct)
                    ));
                }
                headline.push(format!(
                    "Overall sentiment: {} ({:.2})",
                    sentiment.label, sentiment.score
                ));
                let mut details: Vec<String> = sentiment
                    .basis
                    .iter()
                    .map(|b| format!("Signal: {b}"))
                    .collect();
                details.extend(
                    signals
                        .iter()
                        .map(|s| format!("{} signal: {} - {}", s.horizon, s.action, s.reason)),
                );
                (headline, details)
            }
            Self::ComparisonExplanation(report) => {
                let headline = vec![format!(
                    "Comparing protocols: {}",
                    report.subjects.join(", ")
                )];
                let mut details = Vec::new();
                for (i, group) in report.groups.iter().enumerate() {
                    details.push(format!(
                        "Option {}: {} - max APY {}, median APY {}, {} pools",
                        i + 1,
                        group.subject,
                        format_pct(group.max_apy),
                        format_pct(group.median_apy),
                        group.rows.len()
                    ));
                }
                for group in &report.groups {
                    for row in &group.rows {
                        details.push(format!(
                            "  {} {} on {}: {} APY, {} TVL",
                            group.subject,
                            row.asset,
                            row.chain,
                            format_pct(row.apy),
                            format_usd(row.tvl)
                        ));
                    }
                }
                (headline, details)
            }
            Self::SentimentSummary(sentiment) => {
                let headline = vec![
                    format!("Subject: {}", sentiment.subject),
                    format!(
                        "Overall sentiment: {} (score {:.2})",
                        sentiment.label, sentiment.score
                    ),
                ];
                let details = sentiment
                    .basis
                    .iter()
                    .map(|b| format!("Contributing: {b}"))
                    .collect();
                (headline, details)
            }
            Self::EntryExplanation {
                recommendation,
                quote,
            } => {
                let mut headline = vec![
                    format!("Token: {}", recommendation.subject),
                    format!(
                        "Recommendation: {}",
                        if recommendation.enter_now {
                            "enter now"
                        } else {
                            "wait"
                        }
                    ),
                    format!("Confidence: {}", recommendation.confidence),
                ];
                if let Some(quote) = quote {
                    headline.push(format!("Current price: {}", format_usd(quote.price_usd)));
                }
                let details = recommendation
                    .reasoning
                    .iter()
                    .map(|r| format!("- {r}"))
                    .collect();
                (headline, details)
            }
        }
    }

    /// Instruction block appended after the payload
    fn ask(&self) -> &'static str {
        match self.kind() {
            InsightKind::YieldAnalysis => {
                "Please provide:\n\
                 1. A brief analysis of this yield opportunity\n\
                 2. Potential risks to be aware of\n\
                 3. Whether it suits conservative, moderate or high-risk investors\n\
                 Keep your response concise and focused on the most important factors."
            }
            InsightKind::TradingInsight => {
                "Please provide:\n\
                 1. A brief technical read of the price movements\n\
                 2. Key factors that might be influencing this token\n\
                 3. Short-term (24-48h) and medium-term (1-2 week) outlook\n\
                 Keep your response concise and focused on actionable insights."
            }
            InsightKind::ComparisonExplanation => {
                "Please provide:\n\
                 1. A comparison of the risk-reward profiles\n\
                 2. Which option might suit different investor types\n\
                 3. Notable advantages or disadvantages of each option\n\
                 Keep your response concise and focused on an informed decision."
            }
            InsightKind::SentimentSummary => {
                "Please provide:\n\
                 1. A brief summary of current market conditions\n\
                 2. What this might mean for traders and investors\n\
                 3. Key trends or patterns to watch\n\
                 Keep your response concise and focused on actionable insights."
            }
            InsightKind::EntryExplanation => {
                "Please provide:\n\
                 1. An explanation of this recommendation in simple terms\n\
                 2. The factors that matter most in this decision\n\
                 3. What to watch for if the user decides to wait\n\
                 Keep your response conversational and easy to understand."
            }
        }
    }

    /// Full prompt with the payload bounded to `PAYLOAD_BUDGET_CHARS`
    pub fn prompt(&self) -> String {
        let (headline, details) = self.payload_lines();

        let mut payload = headline.join("\n");
        if payload.chars().count() > PAYLOAD_BUDGET_CHARS {
            payload = yieldbot_core::format::truncate_with_ellipsis(&payload, PAYLOAD_BUDGET_CHARS);
        } else {
            for line in details {
                if payload.chars().count() + line.chars().count() + 1 > PAYLOAD_BUDGET_CHARS {
                    break;
                }
                payload.push('\n');
                payload.push_str(&line);
            }
        }

        format!("{}\n\n{}\n\n{}", self.intro(), payload, self.ask())
    }

    fn intro(&self) -> &'static str {
        match self.kind() {
            InsightKind::YieldAnalysis => {
                "Analyze this DeFi yield opportunity and provide insights:"
            }
            InsightKind::TradingInsight => "Provide trading insights for this token:",
            InsightKind::ComparisonExplanation => {
                "Compare these DeFi yield opportunities and explain the key differences:"
            }
            InsightKind::SentimentSummary => {
                "Summarize the current crypto market sentiment based on this data:"
            }
            InsightKind::EntryExplanation => "Explain this yield entry recommendation:",
        }
    }

    /// Deterministic non-AI summary built purely from the payload
    pub fn fallback(&self) -> String {
        match self {
            Self::YieldAnalysis(opp) => {
                let risk_note = match opp.risk_tag {
                    RiskTag::Low => "Deep liquidity and a modest APY suggest a conservative fit.",
                    RiskTag::Medium => {
                        "Reasonable liquidity with a moderate APY; suits balanced portfolios."
                    }
                    RiskTag::High => {
                        "Thin liquidity or an outsized APY; treat as a speculative position."
                    }
                    RiskTag::Unknown => "Risk could not be assessed from the available metrics.",
                };
                format!(
                    "{} on {} ({}) is offering {} APY with {} TVL. Risk: {}. {}",
                    opp.protocol,
                    opp.chain,
                    opp.asset,
                    format_pct(opp.apy),
                    format_usd(opp.tvl),
                    opp.risk_tag,
                    risk_note
                )
            }
            Self::TradingInsight {
                quote,
                sentiment,
                signals,
            } => {
                let mut out = match quote {
                    Some(quote) => format!(
                        "{} trades at {} ({} over 24h); sentiment reads {}.",
                        quote.symbol,
                        format_usd(quote.price_usd),
                        format_signed_pct(quote.change_24h_pct),
                        sentiment.label
                    ),
                    None => format!(
                        "Sentiment for {} reads {} (score {:.2}).",
                        sentiment.subject, sentiment.label, sentiment.score
                    ),
                };
                for signal in signals {
                    out.push_str(&format!(" {}: {}.", s_capitalize(&signal.horizon.to_string()), signal.reason));
                }
                out
            }
            Self::ComparisonExplanation(report) => {
                let mut out = String::from("Yield comparison summary:\n");
                for group in &report.groups {
                    out.push_str(&format!(
                        "- {}: max APY {}, median APY {} across {} pools\n",
                        group.subject,
                        format_pct(group.max_apy),
                        format_pct(group.median_apy),
                        group.rows.len()
                    ));
                }
                if let Some(leader) = report.groups.first() {
                    out.push_str(&format!(
                        "{} currently leads on headline APY.",
                        leader.subject
                    ));
                }
                out
            }
            Self::SentimentSummary(sentiment) => {
                let mut out = format!(
                    "Sentiment for {} is {} (score {:.2}).",
                    sentiment.subject, sentiment.label, sentiment.score
                );
                if !sentiment.basis.is_empty() {
                    out.push_str(" Based on: ");
                    out.push_str(&sentiment.basis.join("; "));
                    out.push('.');
                }
                out
            }
            Self::EntryExplanation { recommendation, .. } => {
                let verdict = if recommendation.enter_now {
                    "now looks like a reasonable time to enter"
                } else {
                    "waiting looks prudent for now"
                };
                format!(
                    "For {}, {} (confidence: {}). Reasoning: {}",
                    recommendation.subject,
                    verdict,
                    recommendation.confidence,
                    recommendation.reasoning.join("; ")
                )
            }
        }
    }
}

fn s_capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Composes narrative insights with single-attempt generation + fallback
pub struct Composer {
    generator: Arc<dyn TextGenerator>,
}

impl Composer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Compose a narrative for the payload. Infallible by contract: any
    /// generation failure degrades to the template fallback.
    pub async fn compose(&self, payload: &InsightPayload) -> Insight {
        let prompt = payload.prompt();

        match self.generator.generate(SYSTEM_PROMPT, &prompt).await {
            Ok(text) if !text.trim().is_empty() => Insight {
                text,
                degraded: false,
            },
            Ok(_) => {
                tracing::warn!(kind = ?payload.kind(), "generator returned empty completion, using fallback");
                Insight {
                    text: payload.fallback(),
                    degraded: true,
                }
            }
            Err(e) => {
                tracing::warn!(kind = ?payload.kind(), error = %e, "generation failed, using fallback");
                Insight {
                    text: payload.fallback(),
                    degraded: true,
                }
            }
        }
    }
}
