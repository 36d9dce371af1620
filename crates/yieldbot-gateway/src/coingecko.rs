//! CoinGecko Market Data
//!
//! Response shapes and normalization for quotes, price series and the
//! market-cap basket.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use yieldbot_core::{PricePoint, TokenQuote};

/// `/simple/price` response: token id -> price entry
pub(crate) type SimplePriceResponse = HashMap<String, PriceEntry>;

#[derive(Debug, Deserialize)]
pub(crate) struct PriceEntry {
    pub usd: Option<f64>,
    #[serde(rename = "usd_24h_change")]
    pub usd_24h_change: Option<f64>,
}

/// `/coins/{id}/market_chart` response
#[derive(Debug, Deserialize)]
pub(crate) struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<(f64, f64)>,
}

pub(crate) fn quote_from_entry(id: &str, entry: &PriceEntry) -> Option<TokenQuote> {
    let price = Decimal::from_f64_retain(entry.usd?)?;
    if price < Decimal::ZERO {
        return None;
    }
    let change = entry
        .usd_24h_change
        .and_then(Decimal::from_f64_retain)
        .unwrap_or(Decimal::ZERO);
    Some(TokenQuote::new(id, price, change))
}

/// Convert a market chart into a price series, dropping malformed points.
/// Returns the series plus the dropped count.
pub(crate) fn series_from_chart(chart: MarketChartResponse) -> (Vec<PricePoint>, usize) {
    let total = chart.prices.len();
    let mut points: Vec<PricePoint> = chart
        .prices
        .into_iter()
        .filter_map(|(ms, price)| {
            let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(ms as i64)?;
            let price = Decimal::from_f64_retain(price)?;
            if price <= Decimal::ZERO {
                return None;
            }
            Some(PricePoint { timestamp, price })
        })
        .collect();
    points.sort_by_key(|p| p.timestamp);
    let dropped = total - points.len();
    (points, dropped)
}
