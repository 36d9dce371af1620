//! Domain Models
//!
//! Core data types for yield and market data. Uses `rust_decimal` for all
//! monetary values - never use f64 for money! Every entity is rebuilt fresh
//! per invocation and discarded after the reply is rendered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Qualitative risk bucket for a yield opportunity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTag {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskTag {
    /// Classify risk from pool metrics when the upstream gives no explicit tag.
    ///
    /// Deep liquidity with a plausible APY reads as low risk; thin pools or
    /// outsized APYs read as high risk.
    pub fn from_metrics(apy: Decimal, tvl: Decimal) -> Self {
        if tvl <= Decimal::ZERO {
            return Self::Unknown;
        }
        if tvl >= dec!(10_000_000) && apy <= dec!(15) {
            Self::Low
        } else if tvl >= dec!(1_000_000) && apy <= dec!(50) {
            Self::Medium
        } else {
            Self::High
        }
    }
}

impl std::fmt::Display for RiskTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// User risk preference for yield recommendations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskPreference {
    Stable,
    Balanced,
    Aggressive,
}

impl RiskPreference {
    /// Parse a user-supplied preference, case-insensitive
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "stable" => Some(Self::Stable),
            "balanced" => Some(Self::Balanced),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    /// Risk tags acceptable under this preference
    pub fn allowed_tags(self) -> &'static [RiskTag] {
        match self {
            Self::Stable => &[RiskTag::Low],
            Self::Balanced => &[RiskTag::Low, RiskTag::Medium],
            Self::Aggressive => &[RiskTag::Low, RiskTag::Medium, RiskTag::High],
        }
    }
}

impl std::fmt::Display for RiskPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Balanced => write!(f, "balanced"),
            Self::Aggressive => write!(f, "aggressive"),
        }
    }
}

/// A single yield opportunity, normalized from the upstream pool listing.
///
/// Immutable once fetched; identity is the (protocol, chain, asset) tuple
/// within the current snapshot only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct YieldOpportunity {
    /// Protocol name, normalized lowercase (e.g. "aave")
    pub protocol: String,

    /// Chain name, normalized lowercase (e.g. "ethereum")
    pub chain: String,

    /// Pool / asset label (e.g. "USDC", "ETH-USDC")
    pub asset: String,

    /// Annualized percentage yield (already annualized, never a raw rate)
    pub apy: Decimal,

    /// Total value locked in USD
    pub tvl: Decimal,

    /// Risk bucket
    pub risk_tag: RiskTag,
}

impl YieldOpportunity {
    pub fn new(
        protocol: impl Into<String>,
        chain: impl Into<String>,
        asset: impl Into<String>,
        apy: Decimal,
        tvl: Decimal,
    ) -> Self {
        let risk_tag = RiskTag::from_metrics(apy, tvl);
        Self {
            protocol: protocol.into().to_lowercase(),
            chain: chain.into().to_lowercase(),
            asset: asset.into(),
            apy,
            tvl,
            risk_tag,
        }
    }
}

/// Spot quote for a single token
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenQuote {
    /// Ticker or upstream id (e.g. "BTC", "bitcoin")
    pub symbol: String,

    /// Current price in USD
    pub price_usd: Decimal,

    /// 24-hour price change percentage (may be negative)
    pub change_24h_pct: Decimal,

    /// When this quote was fetched
    pub fetched_at: DateTime<Utc>,
}

impl TokenQuote {
    pub fn new(symbol: impl Into<String>, price_usd: Decimal, change_24h_pct: Decimal) -> Self {
        Self {
            symbol: symbol.into().to_uppercase(),
            price_usd,
            change_24h_pct,
            fetched_at: Utc::now(),
        }
    }
}

/// One observation in a market price series
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

/// Sentiment label derived from a score
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bearish,
    Neutral,
    Bullish,
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bearish => write!(f, "bearish"),
            Self::Neutral => write!(f, "neutral"),
            Self::Bullish => write!(f, "bullish"),
        }
    }
}

/// Result of sentiment scoring over one subject or the whole market
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentimentResult {
    /// Token symbol, or "market" for the basket-wide score
    pub subject: String,

    /// Score in [-1.0, 1.0]
    pub score: f64,

    /// Label derived from the score thresholds
    pub label: SentimentLabel,

    /// Contributing signals, in the order they were applied
    pub basis: Vec<String>,
}

/// Per-subject rows and summary statistics in a comparison
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonGroup {
    pub subject: String,
    pub max_apy: Decimal,
    pub median_apy: Decimal,
    pub rows: Vec<YieldOpportunity>,
}

/// Cross-protocol yield comparison
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Requested subjects, normalized lowercase
    pub subjects: Vec<String>,

    /// Groups for subjects that actually had data, ordered by max APY descending
    pub groups: Vec<ComparisonGroup>,
}

/// Time horizon a trading signal speaks to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalHorizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
    General,
}

impl std::fmt::Display for SignalHorizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShortTerm => write!(f, "short-term"),
            Self::MediumTerm => write!(f, "medium-term"),
            Self::LongTerm => write!(f, "long-term"),
            Self::General => write!(f, "general"),
        }
    }
}

/// Signal action derived from price-change thresholds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    StrongBuy,
    Buy,
    Sell,
    StrongSell,
    BuyDip,
    SellRally,
    TakeProfit,
    Accumulate,
    Neutral,
}

impl SignalAction {
    /// Whether this action argues for entering a position
    pub fn is_entry_signal(self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy | Self::BuyDip)
    }
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "strong buy"),
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::StrongSell => write!(f, "strong sell"),
            Self::BuyDip => write!(f, "buy the dip"),
            Self::SellRally => write!(f, "sell the rally"),
            Self::TakeProfit => write!(f, "take profit"),
            Self::Accumulate => write!(f, "accumulate"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// One derived trading signal
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradingSignal {
    pub horizon: SignalHorizon,
    pub action: SignalAction,
    pub reason: String,
}

/// Confidence level attached to an entry recommendation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Combined sentiment + signal heuristic for entering a yield position
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryRecommendation {
    pub subject: String,
    pub enter_now: bool,
    pub confidence: Confidence,
    pub reasoning: Vec<String>,
}
