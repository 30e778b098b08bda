//! Merge engine, adaptive learner, and structured merge results.

pub mod engine;
pub mod learner;
pub mod result;

pub use engine::{MergeEngine, CONCURRENT_MODIFICATIONS};
pub use learner::{Activation, FieldChoice, LearnerSummary, MergeLearner};
pub use result::{ConflictKind, MergeConflict, MergeResult, MergeStrategy};
