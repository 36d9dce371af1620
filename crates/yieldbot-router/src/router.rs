//! Command Dispatch
//!
//! One entry point, `Router::handle`: parse the raw text, execute the
//! command against the gateway and aggregation layer, render a reply.
//! Every path ends in a reply; errors surface as their single user-facing
//! message and internals are logged, never shown.

use std::sync::Arc;

use yieldbot_core::{aggregate, BotError, Result};
use yieldbot_gateway::{fetch_yields_per_subject, DataGateway, YieldFilter};
use yieldbot_insight::{Composer, InsightPayload};

use crate::command::Command;
use crate::reply::{
    render_comparison, render_entry, render_help, render_market_sentiment, render_quote,
    render_signals, render_token_sentiment, render_welcome, render_yield_list, Reply,
};

/// Lookback window for price-series commands
const SERIES_WINDOW_DAYS: u32 = 30;

/// Row cap for filtered and recommended yield lists
const LIST_LIMIT: usize = 5;

/// Tokens sampled for the market-wide sentiment read
const DEFAULT_BASKET: &[&str] = &["bitcoin", "ethereum", "solana", "cardano", "polkadot"];

/// Routes parsed commands to gateway fetches, aggregation and rendering
pub struct Router {
    gateway: Arc<dyn DataGateway>,
    composer: Composer,
}

impl Router {
    pub fn new(gateway: Arc<dyn DataGateway>, composer: Composer) -> Self {
        Self { gateway, composer }
    }

    /// Handle one raw message. Always produces a reply.
    pub async fn handle(&self, input: &str) -> Reply {
        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(e) => return Reply::from_error(&e),
        };

        tracing::debug!(?command, "dispatching");
        match self.execute(command).await {
            Ok(reply) => reply,
            Err(e) => {
                if let BotError::Internal(detail) = &e {
                    tracing::error!(error = %detail, "internal failure while handling command");
                }
                Reply::from_error(&e)
            }
        }
    }

    async fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Start => Ok(render_welcome()),
            Command::Help => Ok(render_help()),
            Command::TopYields { count } => self.top_yields(count).await,
            Command::YieldByProtocol { protocol } => {
                let title = format!("Top Yields for {protocol}");
                self.filtered_yields(title, YieldFilter::protocol(protocol.clone()))
                    .await
            }
            Command::YieldByChain { chain } => {
                let title = format!("Top Yields on {chain}");
                self.filtered_yields(title, YieldFilter::chain(chain.clone()))
                    .await
            }
            Command::CompareYields { protocols } => self.compare_yields(&protocols).await,
            Command::RecommendYields { preference } => {
                let fetched = self.gateway.fetch_yields(&YieldFilter::all()).await?;
                let rows = aggregate::recommend(fetched.records, preference, LIST_LIMIT);
                if rows.is_empty() {
                    return Err(BotError::EmptyResult);
                }
                let title = format!("Recommended Yields ({preference})");
                Ok(render_yield_list(&title, &rows, fetched.dropped, None))
            }
            Command::TokenPrice { symbol } => {
                let quote = self.gateway.fetch_quote(&symbol).await?;
                Ok(render_quote(&quote))
            }
            Command::MarketSentiment => self.market_sentiment().await,
            Command::TokenSentiment { symbol } => self.token_sentiment(&symbol).await,
            Command::TradingSignals { symbol } => {
                let series = self
                    .gateway
                    .fetch_market_series(&symbol, SERIES_WINDOW_DAYS)
                    .await?;
                // The quote enriches the reply but is not required for signals
                let quote = self.gateway.fetch_quote(&symbol).await.ok();
                let signals = aggregate::derive_signals(&series.records);
                Ok(render_signals(
                    &symbol,
                    quote.as_ref(),
                    &signals,
                    series.dropped,
                ))
            }
            Command::YieldEntry { subject } => self.yield_entry(&subject).await,
        }
    }

    async fn top_yields(&self, count: usize) -> Result<Reply> {
        let fetched = self.gateway.fetch_yields(&YieldFilter::all()).await?;
        if fetched.is_empty() {
            return Err(BotError::EmptyResult);
        }

        let rows = aggregate::top_n(fetched.records, count);
        let leader = rows[0].clone();
        let insight = self
            .composer
            .compose(&InsightPayload::YieldAnalysis(leader))
            .await;

        let title = format!("Top {} Yield Opportunities", rows.len());
        Ok(render_yield_list(&title, &rows, fetched.dropped, Some(&insight)))
    }

    async fn filtered_yields(&self, title: String, filter: YieldFilter) -> Result<Reply> {
        let fetched = self.gateway.fetch_yields(&filter).await?;
        if fetched.is_empty() {
            return Err(BotError::EmptyResult);
        }
        let rows = aggregate::top_n(fetched.records, LIST_LIMIT);
        Ok(render_yield_list(&title, &rows, fetched.dropped, None))
    }

    async fn compare_yields(&self, protocols: &[String]) -> Result<Reply> {
        let outcomes = fetch_yields_per_subject(self.gateway.as_ref(), protocols).await;

        let mut combined = Vec::new();
        let mut first_error = None;
        for outcome in outcomes {
            match outcome.outcome {
                Ok(fetched) => combined.extend(fetched.records),
                Err(e) => {
                    tracing::warn!(subject = %outcome.subject, error = %e, "subject fetch failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        // A total outage reads as an upstream problem, not as thin data
        if combined.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        let report = aggregate::compare(&combined, protocols)?;
        let insight = self
            .composer
            .compose(&InsightPayload::ComparisonExplanation(report.clone()))
            .await;
        Ok(render_comparison(&report, &insight))
    }

    async fn market_sentiment(&self) -> Result<Reply> {
        let basket: Vec<String> = DEFAULT_BASKET.iter().map(|s| (*s).to_string()).collect();
        let fetched = self.gateway.fetch_basket(&basket).await?;
        if fetched.is_empty() {
            return Err(BotError::EmptyResult);
        }

        let sentiment = aggregate::score_sentiment(&fetched.records);
        let insight = self
            .composer
            .compose(&InsightPayload::SentimentSummary(sentiment.clone()))
            .await;
        Ok(render_market_sentiment(
            &sentiment,
            &fetched.records,
            fetched.dropped,
            &insight,
        ))
    }

    async fn token_sentiment(&self, symbol: &str) -> Result<Reply> {
        let (series, quote) = tokio::join!(
            self.gateway.fetch_market_series(symbol, SERIES_WINDOW_DAYS),
            self.gateway.fetch_quote(symbol),
        );
        // Sentiment comes from the series; a missing quote only thins the reply
        let series = series?;
        let quote = quote.ok();

        let sentiment = aggregate::score_series_sentiment(symbol, &series.records);
        let signals = aggregate::derive_signals(&series.records);
        let insight = self
            .composer
            .compose(&InsightPayload::TradingInsight {
                quote: quote.clone(),
                sentiment: sentiment.clone(),
                signals,
            })
            .await;
        Ok(render_token_sentiment(
            &sentiment,
            quote.as_ref(),
            &insight,
            series.dropped,
        ))
    }

    async fn yield_entry(&self, subject: &str) -> Result<Reply> {
        let series = self
            .gateway
            .fetch_market_series(subject, SERIES_WINDOW_DAYS)
            .await?;
        let quote = self.gateway.fetch_quote(subject).await.ok();

        let sentiment = aggregate::score_series_sentiment(subject, &series.records);
        let signals = aggregate::derive_signals(&series.records);
        let recommendation = aggregate::entry_recommendation(subject, &sentiment, &signals);

        let insight = self
            .composer
            .compose(&InsightPayload::EntryExplanation {
                recommendation: recommendation.clone(),
                quote: quote.clone(),
            })
            .await;
        Ok(render_entry(
            &recommendation,
            quote.as_ref(),
            &insight,
            series.dropped,
        ))
    }
}
