//! # yieldbot-insight
//!
//! Narrative layer of the bot. Aggregated data goes in, a short narrative
//! comes out - generated by a hosted model when the endpoint cooperates,
//! rendered from deterministic templates when it does not. The degraded
//! path is a feature, not an error: the user always gets a reply.

mod composer;
mod hosted;
mod provider;

pub use composer::{Composer, Insight, InsightKind, InsightPayload, PAYLOAD_BUDGET_CHARS};
pub use hosted::{HostedGenerator, InsightConfig};
pub use provider::TextGenerator;
