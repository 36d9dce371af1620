//! DeFiLlama Pool Listing
//!
//! Response shapes and normalization for the yields upstream. Rows missing
//! required fields are dropped and counted rather than failing the fetch.

use rust_decimal::Decimal;
use serde::Deserialize;

use yieldbot_core::{RiskTag, YieldOpportunity};

#[derive(Debug, Deserialize)]
pub(crate) struct PoolsResponse {
    #[serde(default)]
    pub data: Vec<PoolRow>,
}

/// One raw pool row; everything optional because the upstream is lenient
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PoolRow {
    pub project: Option<String>,
    pub chain: Option<String>,
    pub symbol: Option<String>,
    pub apy: Option<f64>,
    #[serde(rename = "tvlUsd")]
    pub tvl_usd: Option<f64>,
    #[serde(rename = "ilRisk")]
    pub il_risk: Option<String>,
}

/// Normalize a raw row into the domain type.
///
/// Requires protocol, chain, asset, a non-negative APY and a non-negative
/// TVL; anything else is malformed. Explicit impermanent-loss risk upgrades
/// the metric-derived tag to high.
pub(crate) fn normalize(row: PoolRow) -> Option<YieldOpportunity> {
    let protocol = row.project.filter(|s| !s.trim().is_empty())?;
    let chain = row.chain.filter(|s| !s.trim().is_empty())?;
    let asset = row.symbol.filter(|s| !s.trim().is_empty())?;

    let apy = Decimal::from_f64_retain(row.apy?)?;
    let tvl = Decimal::from_f64_retain(row.tvl_usd?)?;
    if apy < Decimal::ZERO || tvl < Decimal::ZERO {
        return None;
    }

    let mut opp = YieldOpportunity::new(protocol, chain, asset, apy, tvl);
    if row
        .il_risk
        .as_deref()
        .is_some_and(|r| r.eq_ignore_ascii_case("yes"))
    {
        opp.risk_tag = RiskTag::High;
    }
    Some(opp)
}
