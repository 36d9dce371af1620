//! Text Generation Strategy
//!
//! Common interface for hosted generation backends. The composer works
//! exclusively through this trait, which is what lets tests substitute a
//! failing or canned generator.

use async_trait::async_trait;

use yieldbot_core::Result;

/// Strategy trait for text-generation backends
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for one system + user prompt pair.
    ///
    /// Implementations make exactly one attempt; the composer falls back to
    /// templates on failure rather than retrying.
    async fn generate(&self, system: &str, prompt: &str) -> Result<String>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
