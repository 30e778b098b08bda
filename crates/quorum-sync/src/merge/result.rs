use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::causal::CausalSnapshot;
use crate::consensus::{ConsensusMethod, ConsensusOutcome};

/// How a merge was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "method")]
pub enum MergeStrategy {
    /// Structural quorum agreed; local kept as is.
    Quorum(ConsensusMethod),
    /// Peer descends from local; peer fields adopted.
    FastForward,
    /// Learner-guided per-field blend.
    Adaptive,
    LastWriterWins,
    Unresolved,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quorum(_) => "quorum",
            Self::FastForward => "fast_forward",
            Self::Adaptive => "adaptive",
            Self::LastWriterWins => "last_writer_wins",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quorum(method) => write!(f, "quorum({method})"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    LastWriterWins,
    Adaptive,
    Unresolved,
}

/// Fields that disagreed and how the disagreement was handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub fields: Vec<String>,
    pub kind: ConflictKind,
    pub local_timestamp: u64,
    pub peer_timestamp: u64,
}

/// Structured merge outcome. On failure `new_state` is the untouched local
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    pub success: bool,
    pub new_state: Arc<CausalSnapshot>,
    pub conflicts: Vec<MergeConflict>,
    pub strategy_used: MergeStrategy,
    pub consensus: ConsensusOutcome,
    pub reason: Option<String>,
}

impl MergeResult {
    pub fn failed(local: Arc<CausalSnapshot>, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            new_state: local,
            conflicts: Vec::new(),
            strategy_used: MergeStrategy::Unresolved,
            consensus: ConsensusOutcome::none(),
            reason: Some(reason.into()),
        }
    }
}
