//! End-to-end router tests over the mock gateway: raw message in,
//! rendered reply out.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;
use yieldbot_core::{BotError, PricePoint, Result, TokenQuote, YieldOpportunity};
use yieldbot_gateway::{DataGateway, Fetched, MockGateway, YieldFilter};
use yieldbot_insight::{Composer, TextGenerator};
use yieldbot_router::Router;

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
        Ok("Canned market narrative.".to_string())
    }
    fn name(&self) -> &str {
        "canned"
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String> {
        Err(yieldbot_core::BotError::UpstreamUnavailable(
            "simulated generator outage".into(),
        ))
    }
    fn name(&self) -> &str {
        "failing"
    }
}

/// Mock wrapper that reports malformed points dropped from every series
struct LossySeriesGateway(MockGateway);

#[async_trait]
impl DataGateway for LossySeriesGateway {
    async fn fetch_yields(&self, filter: &YieldFilter) -> Result<Fetched<YieldOpportunity>> {
        self.0.fetch_yields(filter).await
    }
    async fn fetch_quote(&self, symbol: &str) -> Result<TokenQuote> {
        self.0.fetch_quote(symbol).await
    }
    async fn fetch_market_series(&self, symbol: &str, days: u32) -> Result<Fetched<PricePoint>> {
        let mut fetched = self.0.fetch_market_series(symbol, days).await?;
        fetched.dropped = 2;
        Ok(fetched)
    }
    async fn fetch_basket(&self, symbols: &[String]) -> Result<Fetched<TokenQuote>> {
        self.0.fetch_basket(symbols).await
    }
    fn name(&self) -> &str {
        "lossy-series"
    }
}

/// Mock wrapper whose quote endpoint is down while series still work
struct QuoteOutageGateway(MockGateway);

#[async_trait]
impl DataGateway for QuoteOutageGateway {
    async fn fetch_yields(&self, filter: &YieldFilter) -> Result<Fetched<YieldOpportunity>> {
        self.0.fetch_yields(filter).await
    }
    async fn fetch_quote(&self, _symbol: &str) -> Result<TokenQuote> {
        Err(BotError::UpstreamUnavailable("quote endpoint down".into()))
    }
    async fn fetch_market_series(&self, symbol: &str, days: u32) -> Result<Fetched<PricePoint>> {
        self.0.fetch_market_series(symbol, days).await
    }
    async fn fetch_basket(&self, symbols: &[String]) -> Result<Fetched<TokenQuote>> {
        self.0.fetch_basket(symbols).await
    }
    fn name(&self) -> &str {
        "quote-outage"
    }
}

fn router_over(gateway: impl DataGateway + 'static) -> Router {
    Router::new(
        Arc::new(gateway),
        Composer::new(Arc::new(CannedGenerator)),
    )
}

#[tokio::test]
async fn test_top_yields_ranking_and_tie_break() {
    let pools = vec![
        YieldOpportunity::new("gamma", "ethereum", "POOL", dec!(20), dec!(500_000_000)),
        YieldOpportunity::new("beta", "ethereum", "POOL", dec!(45), dec!(150_000_000)),
        YieldOpportunity::new("alpha", "ethereum", "POOL", dec!(45), dec!(200_000_000)),
    ];
    let router = router_over(MockGateway::with_pools(pools));

    let reply = router.handle("top_yields 3").await;

    // Equal APY breaks the tie on TVL, so alpha leads
    let alpha = reply.text.find("alpha").expect("alpha listed");
    let beta = reply.text.find("beta").expect("beta listed");
    let gamma = reply.text.find("gamma").expect("gamma listed");
    assert!(alpha < beta && beta < gamma, "wrong order:\n{}", reply.text);
    assert!(reply.text.contains("Canned market narrative."));
    assert!(!reply.degraded);
}

#[tokio::test]
async fn test_unknown_chain_is_empty_not_unavailable() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("yield_by_chain unknownchain").await;
    assert_eq!(reply.text, "No results found for that query.");
}

#[tokio::test]
async fn test_filtered_list_keeps_only_requested_protocol() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("yield_by_protocol aave").await;
    assert!(reply.text.contains("aave"));
    assert!(!reply.text.contains("compound"));
}

#[tokio::test]
async fn test_compare_reports_both_subjects() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("compare_yields aave, compound").await;
    assert!(reply.text.contains("aave"));
    assert!(reply.text.contains("compound"));
    assert!(reply.text.contains("max APY"));
}

#[tokio::test]
async fn test_compare_with_one_dataless_subject() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("compare_yields aave,ghostproto").await;
    assert!(
        reply.text.contains("only 1 returned results"),
        "unexpected reply: {}",
        reply.text
    );
}

#[tokio::test]
async fn test_upstream_outage_message() {
    let router = router_over(MockGateway::with_upstream_failure());
    let reply = router.handle("top_yields").await;
    assert_eq!(
        reply.text,
        "Market data is temporarily unavailable, please try again in a moment."
    );
}

#[tokio::test]
async fn test_generator_failure_degrades_but_replies() {
    let router = Router::new(
        Arc::new(MockGateway::new()),
        Composer::new(Arc::new(FailingGenerator)),
    );
    let reply = router.handle("top_yields 3").await;
    assert!(reply.degraded);
    assert!(reply.text.contains("AI narrative unavailable"));
    // Data portion still renders
    assert!(reply.text.contains("APY"));
}

#[tokio::test]
async fn test_invalid_argument_carries_hint() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("top_yields abc").await;
    assert!(reply.text.contains("Example: top_yields 10"));
}

#[tokio::test]
async fn test_token_price_renders_quote() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("token_price btc").await;
    assert!(reply.text.contains("$97,500.00"));
    assert!(reply.text.contains("+2.50%"));
}

#[tokio::test]
async fn test_token_sentiment_full_pipeline() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("token_sentiment bitcoin").await;
    assert!(reply.text.contains("Sentiment:"));
    assert!(reply.text.contains("Price Changes:"));
    assert!(!reply.degraded);
}

#[tokio::test]
async fn test_trading_signals_without_narrative() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("trading_signals bitcoin").await;
    assert!(reply.text.contains("Signals:"));
    assert!(!reply.text.contains("Analysis"));
}

#[tokio::test]
async fn test_series_dropped_points_reach_the_footnote() {
    let router = router_over(LossySeriesGateway(MockGateway::new()));

    let signals = router.handle("trading_signals bitcoin").await;
    assert!(signals.text.contains("2 upstream record(s)"));

    let sentiment = router.handle("token_sentiment bitcoin").await;
    assert!(sentiment.text.contains("2 upstream record(s)"));

    let entry = router.handle("yield_entry ethereum").await;
    assert!(entry.text.contains("2 upstream record(s)"));
}

#[tokio::test]
async fn test_token_sentiment_survives_quote_outage() {
    let router = router_over(QuoteOutageGateway(MockGateway::new()));
    let reply = router.handle("token_sentiment bitcoin").await;

    // Sentiment comes from the series, so a dead quote endpoint only
    // removes the price line
    assert!(reply.text.contains("Sentiment:"));
    assert!(!reply.text.contains("Current Price:"));
    assert!(!reply.text.contains("temporarily unavailable"));
}

#[tokio::test]
async fn test_market_sentiment_lists_movers() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("market_sentiment").await;
    assert!(reply.text.contains("Top Gainers:"));
    assert!(reply.text.contains("Top Losers:"));
}

#[tokio::test]
async fn test_yield_entry_gives_verdict() {
    let router = router_over(MockGateway::new());
    let reply = router.handle("yield_entry ethereum").await;
    assert!(
        reply.text.contains("Enter now") || reply.text.contains("Wait"),
        "no verdict in: {}",
        reply.text
    );
    assert!(reply.text.contains("Reasoning:"));
}

#[tokio::test]
async fn test_start_and_help() {
    let router = router_over(MockGateway::new());

    let welcome = router.handle("/start").await;
    assert!(welcome.text.contains("Welcome"));

    let help = router.handle("help").await;
    assert!(help.text.contains("top_yields"));
    assert!(help.text.contains("yield_entry"));
}
