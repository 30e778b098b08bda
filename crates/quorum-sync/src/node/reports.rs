use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use quorum_core::Digest;

use crate::address::NodeAddress;
use crate::causal::{CausalComparison, ChainHealth};
use crate::merge::{LearnerSummary, MergeResult};
use crate::router::QueuedMessage;

/// Outcome of handling one inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiveReport {
    pub message_id: Uuid,
    pub sender: NodeAddress,
    pub comparison: CausalComparison,
    pub merge: MergeResult,
    pub payload: Vec<u8>,
}

/// Messages drained for one peer during a sync pass.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub peer: NodeAddress,
    pub exchanged: usize,
    pub messages: Vec<QueuedMessage>,
}

/// Point-in-time health and state summary of a node.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub node_id: u32,
    pub address: NodeAddress,
    pub timestamp: u64,
    pub root: Digest,
    pub history_size: usize,
    pub queue_depths: BTreeMap<String, usize>,
    pub pending_total: usize,
    pub branches: Vec<String>,
    /// Branch names recovered from an import; their contents are gone.
    pub branch_hints: Vec<String>,
    pub online: bool,
    pub synced: bool,
    pub chain: ChainHealth,
    /// `root: error` for every history entry failing verification.
    pub consistency_failures: Vec<String>,
    pub learner: LearnerSummary,
}

impl Diagnostics {
    pub fn healthy(&self) -> bool {
        self.consistency_failures.is_empty()
    }
}
