//! # yieldbot-core
//!
//! Domain models, error taxonomy and the pure aggregation layer for the
//! DeFi yield bot.
//!
//! Everything in this crate is synchronous and I/O-free: the gateway crate
//! fetches snapshots, this crate transforms them, and the router renders
//! the result. Every ranking, filter and sentiment rule is testable
//! without a network.
//!
//! ## Pipeline
//!
//! ```text
//! command ──> gateway (fetch) ──> aggregate (rank/filter/score) ──> reply
//! ```

pub mod aggregate;
pub mod error;
pub mod format;
pub mod model;

pub use error::{BotError, Result};
pub use model::{
    ComparisonGroup, ComparisonReport, Confidence, EntryRecommendation, PricePoint,
    RiskPreference, RiskTag, SentimentLabel, SentimentResult, SignalAction, SignalHorizon,
    TokenQuote, TradingSignal, YieldOpportunity,
};
