//! Retry & Backoff
//!
//! Transient upstream failures (transport errors, HTTP 429/5xx) are retried
//! with exponential backoff; everything else fails fast. Exhausting retries
//! surfaces as `UpstreamUnavailable` with the detail kept server-side.

use std::time::Duration;

use serde::de::DeserializeOwned;

use yieldbot_core::{BotError, Result};

/// Exponential backoff policy for upstream calls
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Retries after the initial attempt
    pub max_retries: u32,

    /// Delay before the first retry
    pub base_delay: Duration,

    /// Multiplier applied per retry
    pub factor: u32,

    /// Ceiling on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            factor: 2,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.factor.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Whether an HTTP status is worth retrying
fn retryable_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// GET a JSON document with timeout + retry semantics.
///
/// The caller's `reqwest::Client` carries the request timeout; this helper
/// owns the retry loop only.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<T> {
    let mut last_error = String::new();

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let delay = policy.delay_for(attempt);
            tracing::warn!(url, attempt, ?delay, "retrying upstream call: {last_error}");
            tokio::time::sleep(delay).await;
        }

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    // A body that fails to parse is not transient
                    return response.json::<T>().await.map_err(|e| {
                        BotError::UpstreamUnavailable(format!("malformed body from {url}: {e}"))
                    });
                }
                if retryable_status(status) {
                    last_error = format!("status {status}");
                    continue;
                }
                return Err(BotError::UpstreamUnavailable(format!(
                    "unexpected status {status} from {url}"
                )));
            }
            Err(e) => {
                // Transport errors (timeouts, resets, DNS) are all transient
                last_error = e.to_string();
            }
        }
    }

    Err(BotError::UpstreamUnavailable(format!(
        "{url} still failing after {} retries: {last_error}",
        policy.max_retries
    )))
}
