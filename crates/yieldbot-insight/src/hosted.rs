//! Hosted Generation Provider
//!
//! Calls an OpenAI-compatible chat-completions endpoint once per compose.
//! No retry here: a slow or flaky generation call degrades to the template
//! fallback instead of stacking latency on the reply.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use yieldbot_core::{BotError, Result};

use crate::provider::TextGenerator;

/// Configuration for the hosted generation endpoint
#[derive(Clone, Debug)]
pub struct InsightConfig {
    /// Chat-completions URL
    pub api_url: String,

    /// Bearer token; generation is skipped entirely when absent
    pub api_key: Option<String>,

    /// Model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token cap
    pub max_tokens: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.fireworks.ai/inference/v1/chat/completions".into(),
            api_key: None,
            model: "accounts/fireworks/models/llama-v3p1-70b-instruct".into(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 30,
        }
    }
}

impl InsightConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("INSIGHT_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("INSIGHT_API_KEY").ok().filter(|k| !k.is_empty()),
            model: std::env::var("INSIGHT_MODEL").unwrap_or(defaults.model),
            timeout_secs: std::env::var("INSIGHT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            ..defaults
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Generator backed by a hosted chat-completions API
pub struct HostedGenerator {
    client: reqwest::Client,
    config: InsightConfig,
}

impl HostedGenerator {
    pub fn new(config: InsightConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BotError::Internal(format!("failed to build http client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(InsightConfig::from_env())
    }
}

#[async_trait]
impl TextGenerator for HostedGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            BotError::UpstreamUnavailable("generation api key not configured".into())
        })?;

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BotError::UpstreamUnavailable(format!("generation call failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::UpstreamUnavailable(format!(
                "generation endpoint returned {status}"
            )));
        }

        let body: ChatResponse = response.json().await.map_err(|e| {
            BotError::UpstreamUnavailable(format!("malformed generation response: {e}"))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(BotError::UpstreamUnavailable("empty completion".into()));
        }
        Ok(content.trim().to_string())
    }

    fn name(&self) -> &str {
        "hosted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InsightConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.api_key.is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let generator = HostedGenerator::new(InsightConfig::default()).unwrap();
        let err = generator.generate("system", "prompt").await.unwrap_err();
        assert!(matches!(err, BotError::UpstreamUnavailable(_)));
    }

    #[test]
    fn test_response_shape_parses() {
        let body = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": "analysis text"}}]
        });
        let parsed: ChatResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("analysis text")
        );
    }
}
