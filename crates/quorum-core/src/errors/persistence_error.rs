//! Export/import errors.

use super::error_code::{self, QuorumErrorCode};

/// Errors raised while exporting or importing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to serialize state: {0}")]
    Serialization(String),

    #[error("failed to deserialize state: {0}")]
    Deserialization(String),

    #[error("unsupported state format version {found}, expected {expected}")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("current snapshot {0} missing from history")]
    MissingSnapshot(String),
}

impl QuorumErrorCode for PersistenceError {
    fn error_code(&self) -> &'static str {
        error_code::PERSISTENCE_ERROR
    }
}
