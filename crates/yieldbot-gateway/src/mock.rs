//! Mock Gateway
//!
//! For tests and demos. Returns realistic static listings and deterministic
//! synthetic price series, so every aggregation path can be exercised
//! without a network.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use yieldbot_core::{BotError, PricePoint, Result, TokenQuote, YieldOpportunity};

use crate::{DataGateway, Fetched, YieldFilter};

/// Static-data gateway with a failure toggle
pub struct MockGateway {
    pools: Vec<YieldOpportunity>,
    /// When set, every call fails as if retries were exhausted
    fail_upstream: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            pools: default_pools(),
            fail_upstream: false,
        }
    }

    /// Simulate an upstream outage on every call
    pub fn with_upstream_failure() -> Self {
        Self {
            pools: Vec::new(),
            fail_upstream: true,
        }
    }

    /// Replace the pool listing (for targeted ranking tests)
    pub fn with_pools(pools: Vec<YieldOpportunity>) -> Self {
        Self {
            pools,
            fail_upstream: false,
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.fail_upstream {
            return Err(BotError::UpstreamUnavailable("mock outage".into()));
        }
        Ok(())
    }

    /// (price, 24h change) per known token id
    fn quote_for(symbol: &str) -> Option<(Decimal, Decimal)> {
        match normalize_id(symbol).as_str() {
            "bitcoin" => Some((dec!(97500), dec!(2.5))),
            "ethereum" => Some((dec!(3450), dec!(1.8))),
            "solana" => Some((dec!(195), dec!(4.2))),
            "cardano" => Some((dec!(0.95), dec!(-1.2))),
            "polkadot" => Some((dec!(7.20), dec!(0.8))),
            "chainlink" => Some((dec!(24.50), dec!(3.1))),
            "avalanche" => Some((dec!(42.00), dec!(5.5))),
            "dogecoin" => Some((dec!(0.38), dec!(-8.0))),
            _ => None,
        }
    }

    /// Deterministic day-over-day percent moves, oldest first.
    ///
    /// Shapes chosen to exercise each signal rule: bitcoin pops short-term,
    /// ethereum dips inside an uptrend, dogecoin bleeds into an
    /// accumulation zone.
    fn daily_changes(symbol: &str) -> Option<Vec<f64>> {
        let changes = match normalize_id(symbol).as_str() {
            "bitcoin" => {
                let mut c = vec![0.3; 31];
                c[30] = 6.0;
                c
            }
            "ethereum" => {
                let mut c = vec![0.0; 31];
                for day in c.iter_mut().skip(24).take(6) {
                    *day = 1.5;
                }
                c[30] = -1.0;
                c
            }
            "dogecoin" => vec![-1.0; 31],
            "solana" => vec![0.05; 31],
            _ => return None,
        };
        Some(changes)
    }
}

fn normalize_id(symbol: &str) -> String {
    let id = symbol.trim().to_lowercase();
    // Common ticker aliases
    match id.as_str() {
        "btc" => "bitcoin".into(),
        "eth" => "ethereum".into(),
        "sol" => "solana".into(),
        "ada" => "cardano".into(),
        "dot" => "polkadot".into(),
        "link" => "chainlink".into(),
        "avax" => "avalanche".into(),
        "doge" => "dogecoin".into(),
        _ => id,
    }
}

fn default_pools() -> Vec<YieldOpportunity> {
    vec![
        YieldOpportunity::new("aave", "ethereum", "USDC", dec!(4.2), dec!(120_000_000)),
        YieldOpportunity::new("aave", "ethereum", "ETH", dec!(2.1), dec!(340_000_000)),
        YieldOpportunity::new("aave", "polygon", "USDT", dec!(5.8), dec!(45_000_000)),
        YieldOpportunity::new("compound", "ethereum", "USDC", dec!(3.9), dec!(95_000_000)),
        YieldOpportunity::new("compound", "ethereum", "DAI", dec!(4.6), dec!(60_000_000)),
        YieldOpportunity::new("lido", "ethereum", "stETH", dec!(3.4), dec!(22_000_000_000)),
        YieldOpportunity::new("curve", "ethereum", "3CRV", dec!(6.8), dec!(180_000_000)),
        YieldOpportunity::new("curve", "arbitrum", "2CRV", dec!(9.5), dec!(14_000_000)),
        YieldOpportunity::new("uniswap", "ethereum", "ETH-USDC", dec!(18.2), dec!(8_000_000)),
        YieldOpportunity::new("degenfarm", "bsc", "DEGEN-BNB", dec!(420), dec!(150_000)),
    ]
}

#[async_trait]
impl DataGateway for MockGateway {
    async fn fetch_yields(&self, filter: &YieldFilter) -> Result<Fetched<YieldOpportunity>> {
        self.check_available()?;

        let records = self
            .pools
            .iter()
            .filter(|opp| {
                filter
                    .protocol
                    .as_ref()
                    .is_none_or(|p| &opp.protocol == p)
                    && filter.chain.as_ref().is_none_or(|c| &opp.chain == c)
                    && filter.min_tvl_usd.is_none_or(|min| opp.tvl >= min)
            })
            .cloned()
            .collect();

        Ok(Fetched::new(records, 0))
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<TokenQuote> {
        self.check_available()?;

        let (price, change) = Self::quote_for(symbol).ok_or(BotError::EmptyResult)?;
        Ok(TokenQuote::new(normalize_id(symbol), price, change))
    }

    async fn fetch_market_series(&self, symbol: &str, days: u32) -> Result<Fetched<PricePoint>> {
        self.check_available()?;

        let changes = Self::daily_changes(symbol).ok_or(BotError::EmptyResult)?;
        let now = Utc::now();
        let keep = (days as usize + 1).min(changes.len());
        let window = &changes[changes.len() - keep..];

        let mut price = dec!(100);
        let mut series = Vec::with_capacity(window.len());
        for (i, pct) in window.iter().enumerate() {
            let age = (window.len() - 1 - i) as i64;
            let factor = Decimal::from_f64_retain(1.0 + pct / 100.0).unwrap_or(Decimal::ONE);
            price *= factor;
            series.push(PricePoint {
                timestamp: now - Duration::days(age),
                price,
            });
        }
        Ok(Fetched::new(series, 0))
    }

    async fn fetch_basket(&self, symbols: &[String]) -> Result<Fetched<TokenQuote>> {
        self.check_available()?;

        let mut records = Vec::new();
        let mut dropped = 0;
        for symbol in symbols {
            match Self::quote_for(symbol) {
                Some((price, change)) => {
                    records.push(TokenQuote::new(normalize_id(symbol), price, change));
                }
                None => dropped += 1,
            }
        }
        Ok(Fetched::new(records, dropped))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_filters_apply() {
        let gateway = MockGateway::new();

        let aave = gateway
            .fetch_yields(&YieldFilter::protocol("aave"))
            .await
            .unwrap();
        assert!(!aave.is_empty());
        assert!(aave.records.iter().all(|o| o.protocol == "aave"));

        let ghost = gateway
            .fetch_yields(&YieldFilter::chain("unknownchain"))
            .await
            .unwrap();
        assert!(ghost.is_empty());
    }

    #[tokio::test]
    async fn test_quote_aliases() {
        let gateway = MockGateway::new();
        let by_id = gateway.fetch_quote("bitcoin").await.unwrap();
        let by_ticker = gateway.fetch_quote("BTC").await.unwrap();
        assert_eq!(by_id.price_usd, by_ticker.price_usd);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty_result() {
        let gateway = MockGateway::new();
        let err = gateway.fetch_quote("notacoin").await.unwrap_err();
        assert_eq!(err, BotError::EmptyResult);
    }

    #[tokio::test]
    async fn test_series_is_deterministic() {
        let gateway = MockGateway::new();
        let a = gateway.fetch_market_series("bitcoin", 30).await.unwrap();
        let b = gateway.fetch_market_series("bitcoin", 30).await.unwrap();
        assert_eq!(a.records.len(), 31);
        assert_eq!(
            a.records.last().unwrap().price,
            b.records.last().unwrap().price
        );
    }

    #[tokio::test]
    async fn test_outage_mode() {
        let gateway = MockGateway::with_upstream_failure();
        let err = gateway.fetch_quote("bitcoin").await.unwrap_err();
        assert!(matches!(err, BotError::UpstreamUnavailable(_)));
    }
}
