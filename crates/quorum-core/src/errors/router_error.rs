//! Offline router errors.

use super::error_code::{self, QuorumErrorCode};

/// Errors raised while queueing or receiving messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("queue for {destination} is full ({capacity} pending)")]
    QueueFull {
        destination: String,
        capacity: usize,
    },

    #[error("message addressed to {recipient} delivered to {local}")]
    Misaddressed { recipient: String, local: String },

    #[error("message schema mismatch: expected {expected} fields, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },
}

impl QuorumErrorCode for RouterError {
    fn error_code(&self) -> &'static str {
        match self {
            RouterError::QueueFull { .. } => error_code::QUEUE_FULL,
            _ => error_code::ROUTER_ERROR,
        }
    }
}
