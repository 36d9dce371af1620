//! # yieldbot-gateway
//!
//! External Data Gateway: typed async clients for the yield listing upstream
//! (DeFiLlama pools) and the price/market upstream (CoinGecko), normalized
//! into the shared domain types.
//!
//! Every call is a fresh round trip with a request timeout and bounded
//! retry/backoff on transient failures; there is no cross-invocation cache.
//! Malformed upstream rows are dropped and counted, never raised.

mod coingecko;
mod config;
mod defillama;
mod fanout;
mod live;
mod mock;
mod retry;

pub use config::GatewayConfig;
pub use fanout::{fetch_yields_per_subject, SubjectYields, MAX_CONCURRENT_FETCHES};
pub use live::HttpGateway;
pub use mock::MockGateway;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use rust_decimal::Decimal;

use yieldbot_core::{PricePoint, Result, TokenQuote, YieldOpportunity};

/// Server-side filter applied when fetching yield listings
#[derive(Clone, Debug, Default)]
pub struct YieldFilter {
    /// Keep only this protocol (normalized lowercase)
    pub protocol: Option<String>,

    /// Keep only this chain (normalized lowercase)
    pub chain: Option<String>,

    /// Drop pools below this TVL; `None` uses the gateway default
    pub min_tvl_usd: Option<Decimal>,
}

impl YieldFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn protocol(name: impl Into<String>) -> Self {
        Self {
            protocol: Some(name.into().to_lowercase()),
            ..Self::default()
        }
    }

    pub fn chain(name: impl Into<String>) -> Self {
        Self {
            chain: Some(name.into().to_lowercase()),
            ..Self::default()
        }
    }
}

/// A fetched batch plus the count of malformed rows that were dropped
#[derive(Clone, Debug)]
pub struct Fetched<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

impl<T> Fetched<T> {
    pub fn new(records: Vec<T>, dropped: usize) -> Self {
        Self { records, dropped }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Gateway trait over the upstream data providers.
///
/// Implement this per backend; the router works exclusively through it.
/// All methods are idempotent reads - no mutation endpoints exist upstream.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Fetch yield opportunities, optionally filtered by protocol/chain
    async fn fetch_yields(&self, filter: &YieldFilter) -> Result<Fetched<YieldOpportunity>>;

    /// Fetch a spot quote for one token
    async fn fetch_quote(&self, symbol: &str) -> Result<TokenQuote>;

    /// Fetch a daily price series reaching back `days` days; malformed
    /// points are dropped and counted
    async fn fetch_market_series(&self, symbol: &str, days: u32) -> Result<Fetched<PricePoint>>;

    /// Fetch quotes for a basket of tokens; individual misses are dropped
    async fn fetch_basket(&self, symbols: &[String]) -> Result<Fetched<TokenQuote>>;

    /// Gateway name for logging
    fn name(&self) -> &str;
}
