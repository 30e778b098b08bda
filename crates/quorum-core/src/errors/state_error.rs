//! Block state and causal state errors.

use super::error_code::{self, QuorumErrorCode};

/// Errors raised while building, updating, or verifying snapshots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field set does not match schema: expected {expected} fields, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// A recomputed digest does not match the stored one. Signals
    /// corruption or tampering and is never auto-repaired.
    #[error("consistency check failed for root {root}: {details}")]
    Consistency { root: String, details: String },

    #[error("logical clock exhausted at timestamp {0}")]
    ClockExhausted(u64),
}

impl QuorumErrorCode for StateError {
    fn error_code(&self) -> &'static str {
        match self {
            StateError::Consistency { .. } => error_code::CONSISTENCY_ERROR,
            _ => error_code::STATE_ERROR,
        }
    }
}
