//! Export/import format for a node's durable state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use quorum_core::errors::PersistenceError;
use quorum_core::Digest;

use crate::address::NodeAddress;
use crate::causal::CausalSnapshot;
use crate::merge::MergeLearner;
use crate::router::QueuedMessage;

/// Everything needed to rebuild a node. Branch names are hints only;
/// branch contents are not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub node_id: u32,
    pub current: CausalSnapshot,
    /// Every snapshot recorded under each root, oldest first.
    pub history: BTreeMap<Digest, Vec<CausalSnapshot>>,
    pub queues: BTreeMap<NodeAddress, Vec<QueuedMessage>>,
    pub branch_names: Vec<String>,
    pub learner: MergeLearner,
    pub online: bool,
    pub synced: bool,
    pub exported_at: DateTime<Utc>,
}

impl PersistedState {
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(json).map_err(|e| PersistenceError::Deserialization(e.to_string()))
    }
}
