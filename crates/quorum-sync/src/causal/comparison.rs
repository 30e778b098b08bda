use serde::{Deserialize, Serialize};

use crate::consensus::ConsensusOutcome;

/// Causal relation of the local snapshot to a peer snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CausalRelation {
    Identical,
    Before,
    After,
    Concurrent,
}

/// Result of comparing the local snapshot against a peer.
///
/// `happens_before` means local precedes the peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalComparison {
    pub happens_before: bool,
    pub happens_after: bool,
    pub concurrent: bool,
    /// Names of fields whose digests differ.
    pub dimensions_changed: Vec<String>,
    pub consensus: ConsensusOutcome,
}

impl CausalComparison {
    pub fn relation(&self) -> CausalRelation {
        match (self.happens_before, self.happens_after, self.concurrent) {
            (true, _, _) => CausalRelation::Before,
            (_, true, _) => CausalRelation::After,
            (_, _, true) => CausalRelation::Concurrent,
            _ => CausalRelation::Identical,
        }
    }
}
