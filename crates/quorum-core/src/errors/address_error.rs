//! Node address codec errors.

use super::error_code::{self, QuorumErrorCode};

/// Malformed fixed-width address input. Values are rejected, never truncated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("routing prefix {0:#x} does not fit in 48 bits")]
    PrefixOverflow(u64),

    #[error("logical clock {0} does not fit in 32 bits")]
    ClockOverflow(u64),

    #[error("address must be exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed address text {input:?}: {reason}")]
    Malformed { input: String, reason: String },
}

impl QuorumErrorCode for AddressError {
    fn error_code(&self) -> &'static str {
        error_code::ADDRESS_ERROR
    }
}
