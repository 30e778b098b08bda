//! Error handling for the quorum sync engine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod address_error;
pub mod branch_error;
pub mod config_error;
pub mod error_code;
pub mod persistence_error;
pub mod router_error;
pub mod state_error;
pub mod view_error;

pub use address_error::AddressError;
pub use branch_error::BranchError;
pub use config_error::ConfigError;
pub use error_code::QuorumErrorCode;
pub use persistence_error::PersistenceError;
pub use router_error::RouterError;
pub use state_error::StateError;
pub use view_error::ViewError;

/// Top-level error aggregating every subsystem error.
#[derive(Debug, thiserror::Error)]
pub enum QuorumError {
    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Branch(#[from] BranchError),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl QuorumErrorCode for QuorumError {
    fn error_code(&self) -> &'static str {
        match self {
            QuorumError::View(e) => e.error_code(),
            QuorumError::Address(e) => e.error_code(),
            QuorumError::State(e) => e.error_code(),
            QuorumError::Branch(e) => e.error_code(),
            QuorumError::Router(e) => e.error_code(),
            QuorumError::Config(e) => e.error_code(),
            QuorumError::Persistence(e) => e.error_code(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type QuorumResult<T> = Result<T, QuorumError>;
