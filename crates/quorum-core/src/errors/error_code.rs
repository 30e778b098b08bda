//! QuorumErrorCode trait for machine-readable error codes.

/// Every error enum implements this to provide a stable code string
/// that survives message rewording.
pub trait QuorumErrorCode {
    /// Returns the code string (e.g., "VIEW_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const VIEW_ERROR: &str = "VIEW_ERROR";
pub const ADDRESS_ERROR: &str = "ADDRESS_ERROR";
pub const STATE_ERROR: &str = "STATE_ERROR";
pub const CONSISTENCY_ERROR: &str = "CONSISTENCY_ERROR";
pub const BRANCH_ERROR: &str = "BRANCH_ERROR";
pub const QUEUE_FULL: &str = "QUEUE_FULL";
pub const ROUTER_ERROR: &str = "ROUTER_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PERSISTENCE_ERROR: &str = "PERSISTENCE_ERROR";
