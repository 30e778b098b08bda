//! # quorum-observability
//!
//! Tracing subscriber setup, span macros, and structured log events for
//! merges, routing, branches, and consistency failures.

pub mod tracing_setup;

pub use tracing_setup::events;
pub use tracing_setup::{init_from_config, init_tracing, init_tracing_with_filter, LOG_ENV_VAR};
