//! Error Types
//!
//! One variant per failure kind the router can surface. Raw upstream error
//! bodies never reach the user; `user_message` is the only text shown.

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Bot error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BotError {
    /// User input malformed; caught before any network call
    #[error("invalid argument: {message}")]
    InvalidArgument {
        message: String,
        /// Human-readable correction hint (e.g. example usage)
        hint: String,
    },

    /// Upstream API still failing after exhausting retries
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Comparison needs at least two subjects with data
    #[error("insufficient subjects: {available} of {needed} have data")]
    InsufficientSubjects { available: usize, needed: usize },

    /// Valid query, zero matching records
    #[error("no matching records")]
    EmptyResult,

    /// Programming-contract violation; logged as a defect, never shown verbatim
    #[error("internal error: {0}")]
    Internal(String),
}

impl BotError {
    pub fn invalid_argument(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Convert to the single user-facing message for this error kind
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidArgument { message, hint } => format!("{message}. {hint}"),
            Self::UpstreamUnavailable(_) => {
                "Market data is temporarily unavailable, please try again in a moment.".into()
            }
            Self::InsufficientSubjects { available, needed } => format!(
                "I need at least {needed} protocols with data to compare, but only {available} returned results."
            ),
            Self::EmptyResult => "No results found for that query.".into(),
            Self::Internal(_) => "Something went wrong on our side. Please try again.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_hides_details() {
        let err = BotError::UpstreamUnavailable("500 body with secrets".into());
        assert!(!err.user_message().contains("secrets"));
    }

    #[test]
    fn test_invalid_argument_includes_hint() {
        let err = BotError::invalid_argument("Count must be a number", "Example: top_yields 10");
        assert!(err.user_message().contains("Example: top_yields 10"));
    }
}
