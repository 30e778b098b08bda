use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quorum_core::Digest;

use crate::address::NodeAddress;
use crate::block::BlockState;
use crate::causal::CausalSnapshot;

/// A state-carrying message between peers.
///
/// The sender's whole block state and its chain of roots travel with the
/// payload so the receiver can compare and merge without a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedMessage {
    pub id: Uuid,
    pub sender: NodeAddress,
    pub recipient: NodeAddress,
    pub payload: Vec<u8>,
    /// Sender's logical timestamp at send time.
    pub timestamp: u64,
    pub block: BlockState,
    /// Roots on the sender's chain, its own root first.
    #[serde(default)]
    pub ancestry: Vec<Digest>,
    pub hop_path: Vec<NodeAddress>,
    pub deliverable: bool,
    pub queued_at: DateTime<Utc>,
}

impl QueuedMessage {
    /// Message carrying a deep copy of `snapshot`'s block. Ancestry starts
    /// as the snapshot's root and, unless genesis, its predecessor.
    pub fn from_snapshot(snapshot: &CausalSnapshot, recipient: NodeAddress, payload: Vec<u8>) -> Self {
        let mut ancestry = vec![snapshot.root()];
        if !snapshot.previous_root().is_genesis() {
            ancestry.push(snapshot.previous_root());
        }
        Self {
            id: Uuid::new_v4(),
            sender: snapshot.address(),
            recipient,
            payload,
            timestamp: snapshot.timestamp(),
            block: snapshot.block().clone(),
            ancestry,
            hop_path: vec![snapshot.address()],
            deliverable: false,
            queued_at: Utc::now(),
        }
    }

    /// The sender's snapshot as carried by the message.
    pub fn snapshot(&self) -> CausalSnapshot {
        CausalSnapshot::new(self.sender.node_id(), self.sender, self.block.clone())
    }

    /// Replace the carried chain with `roots`, keeping the newest
    /// `window` entries (0 keeps all).
    pub fn with_ancestry(mut self, mut roots: Vec<Digest>, window: usize) -> Self {
        if window > 0 {
            roots.truncate(window);
        }
        if !roots.is_empty() {
            self.ancestry = roots;
        }
        self
    }

    /// Roots known to be on the sender's chain.
    pub fn ancestry(&self) -> &[Digest] {
        &self.ancestry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::QuorumConfig;

    use crate::causal::CausalState;

    #[test]
    fn window_keeps_the_newest_roots() {
        let mut s = CausalState::initialize(1, &QuorumConfig::default(), None).unwrap();
        for i in 0..4u8 {
            s.update("index", &[i]).unwrap();
        }
        let to = NodeAddress::encode(s.address().prefix(), 1, 2, 0).unwrap();
        let chain = s.ancestry();
        assert_eq!(chain.len(), 5);

        let full = QueuedMessage::from_snapshot(s.current(), to, Vec::new()).with_ancestry(chain.clone(), 0);
        assert_eq!(full.ancestry(), chain.as_slice());

        let bounded = QueuedMessage::from_snapshot(s.current(), to, Vec::new()).with_ancestry(chain.clone(), 3);
        assert_eq!(bounded.ancestry(), &chain[..3]);
        assert_eq!(bounded.ancestry()[0], s.root());
    }
}
