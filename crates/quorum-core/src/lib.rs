//! # quorum-core
//!
//! Foundation crate for the quorum sync engine.
//! Defines the digest type, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod digest;
pub mod errors;

// Re-export the most commonly used types at the crate root.
pub use config::QuorumConfig;
pub use digest::Digest;
pub use errors::{QuorumError, QuorumResult};
