//! Live HTTP Gateway
//!
//! One `reqwest::Client` per gateway instance; the connection pool may be
//! shared across concurrent invocations but carries no correctness-bearing
//! state.

use std::time::Duration;

use async_trait::async_trait;

use yieldbot_core::{BotError, PricePoint, Result, TokenQuote, YieldOpportunity};

use crate::coingecko::{self, MarketChartResponse, SimplePriceResponse};
use crate::config::GatewayConfig;
use crate::defillama::{self, PoolsResponse};
use crate::retry::{get_json, RetryPolicy};
use crate::{DataGateway, Fetched, YieldFilter};

/// Gateway over the live DeFiLlama and CoinGecko endpoints
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    policy: RetryPolicy,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BotError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            config,
            policy: RetryPolicy::default(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn matches_filter(&self, opp: &YieldOpportunity, filter: &YieldFilter) -> bool {
        if let Some(protocol) = &filter.protocol {
            if &opp.protocol != protocol {
                return false;
            }
        }
        if let Some(chain) = &filter.chain {
            if &opp.chain != chain {
                return false;
            }
        }
        let min_tvl = filter.min_tvl_usd.unwrap_or(self.config.min_tvl_usd);
        opp.tvl >= min_tvl
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn fetch_yields(&self, filter: &YieldFilter) -> Result<Fetched<YieldOpportunity>> {
        let response: PoolsResponse =
            get_json(&self.client, &self.config.yields_url, &self.policy).await?;

        let total = response.data.len();
        let normalized: Vec<YieldOpportunity> = response
            .data
            .into_iter()
            .filter_map(defillama::normalize)
            .collect();
        let dropped = total - normalized.len();
        if dropped > 0 {
            tracing::warn!(dropped, total, "dropped malformed pool rows");
        }

        let records = normalized
            .into_iter()
            .filter(|opp| self.matches_filter(opp, filter))
            .collect();

        Ok(Fetched::new(records, dropped))
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<TokenQuote> {
        let id = symbol.trim().to_lowercase();
        let url = format!(
            "{}/simple/price?ids={id}&vs_currencies=usd&include_24hr_change=true",
            self.config.market_base_url
        );
        let response: SimplePriceResponse = get_json(&self.client, &url, &self.policy).await?;

        response
            .get(&id)
            .and_then(|entry| coingecko::quote_from_entry(&id, entry))
            .ok_or(BotError::EmptyResult)
    }

    async fn fetch_market_series(&self, symbol: &str, days: u32) -> Result<Fetched<PricePoint>> {
        let id = symbol.trim().to_lowercase();
        let url = format!(
            "{}/coins/{id}/market_chart?vs_currency=usd&days={days}&interval=daily",
            self.config.market_base_url
        );
        let chart: MarketChartResponse = get_json(&self.client, &url, &self.policy).await?;

        let (series, dropped) = coingecko::series_from_chart(chart);
        if dropped > 0 {
            tracing::warn!(symbol = %id, dropped, "dropped malformed price points");
        }
        if series.is_empty() {
            return Err(BotError::EmptyResult);
        }
        Ok(Fetched::new(series, dropped))
    }

    async fn fetch_basket(&self, symbols: &[String]) -> Result<Fetched<TokenQuote>> {
        let ids: Vec<String> = symbols.iter().map(|s| s.trim().to_lowercase()).collect();
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd&include_24hr_change=true",
            self.config.market_base_url,
            ids.join(",")
        );
        let response: SimplePriceResponse = get_json(&self.client, &url, &self.policy).await?;

        let mut records = Vec::new();
        let mut dropped = 0;
        for id in &ids {
            match response
                .get(id)
                .and_then(|entry| coingecko::quote_from_entry(id, entry))
            {
                Some(quote) => records.push(quote),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, requested = ids.len(), "basket symbols missing upstream");
        }

        Ok(Fetched::new(records, dropped))
    }

    fn name(&self) -> &str {
        "live"
    }
}
