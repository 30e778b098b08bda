//! Branch manager errors.

use super::error_code::{self, QuorumErrorCode};

/// Errors raised by fork and branch update operations.
///
/// Merging a missing branch is reported as a failed merge result instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BranchError {
    #[error("branch already exists: {0}")]
    AlreadyExists(String),

    #[error("branch not found: {0}")]
    NotFound(String),

    #[error("invalid branch name: {0:?}")]
    InvalidName(String),
}

impl QuorumErrorCode for BranchError {
    fn error_code(&self) -> &'static str {
        error_code::BRANCH_ERROR
    }
}
