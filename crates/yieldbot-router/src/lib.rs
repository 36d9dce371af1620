//! # yieldbot-router
//!
//! Front door of the bot: raw message text comes in, a rendered reply goes
//! out. Parsing validates argument shape before any network call, dispatch
//! fans out to the gateway and aggregation layer, and rendering turns the
//! results (plus an optional AI narrative) into a bounded markdown reply.

pub mod command;
pub mod reply;
pub mod router;

pub use command::{Command, DEFAULT_TOP_COUNT, MAX_TOP_COUNT};
pub use reply::{Reply, MAX_REPLY_CHARS};
pub use router::Router;
