//! Causal state: snapshots, history, and causal comparison.

pub mod comparison;
pub mod snapshot;
pub mod state;

pub use comparison::{CausalComparison, CausalRelation};
pub use snapshot::CausalSnapshot;
pub use state::{CausalState, ChainHealth, SnapshotsAt};
