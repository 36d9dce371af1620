//! Gateway Configuration

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Upstream endpoints and request limits
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Yield listing endpoint (DeFiLlama pools)
    pub yields_url: String,

    /// Price/market data base URL (CoinGecko v3)
    pub market_base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Pools below this TVL are dropped from yield listings
    pub min_tvl_usd: Decimal,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            yields_url: "https://yields.llama.fi/pools".into(),
            market_base_url: "https://api.coingecko.com/api/v3".into(),
            timeout_secs: 10,
            min_tvl_usd: dec!(1_000_000),
        }
    }
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            yields_url: std::env::var("YIELDS_API_URL").unwrap_or(defaults.yields_url),
            market_base_url: std::env::var("MARKET_API_URL").unwrap_or(defaults.market_base_url),
            timeout_secs: std::env::var("GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            min_tvl_usd: std::env::var("MIN_TVL_USD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.min_tvl_usd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.min_tvl_usd, dec!(1_000_000));
        assert!(config.yields_url.contains("llama"));
    }
}
