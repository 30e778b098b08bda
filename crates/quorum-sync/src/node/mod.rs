//! Node facade: the combined public API plus its reports and export format.

pub mod facade;
pub mod persistence;
pub mod reports;

pub use facade::QuorumNode;
pub use persistence::PersistedState;
pub use reports::{Diagnostics, ReceiveReport, SyncReport};
