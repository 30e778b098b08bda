//! OfflineRouter: per-destination queues for peers that are not reachable.
//!
//! A destination is reachable when the router is online and it shares the
//! sender's routing prefix. Queues are keyed by the destination address with
//! its clock cleared, so one peer has one queue across its updates.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use quorum_core::config::RouterConfig;
use quorum_core::errors::RouterError;
use quorum_observability::events;

use super::message::QueuedMessage;
use crate::address::NodeAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Immediate,
    Queued,
}

/// What `send` did with a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub message_id: Uuid,
    pub mode: DeliveryMode,
    pub destination: NodeAddress,
    pub queue_depth: usize,
    pub estimated_steps: u8,
    /// Present for immediate delivery; hand it to the transport.
    pub message: Option<QueuedMessage>,
}

#[derive(Debug, Clone)]
pub struct OfflineRouter {
    online: bool,
    max_queue_size: usize,
    queues: BTreeMap<NodeAddress, VecDeque<QueuedMessage>>,
}

impl OfflineRouter {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            online: config.start_online,
            max_queue_size: config.max_queue_size,
            queues: BTreeMap::new(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn set_online(&mut self, online: bool) {
        debug!(online, "router connectivity changed");
        self.online = online;
    }

    pub fn is_reachable(&self, from: &NodeAddress, to: &NodeAddress) -> bool {
        self.online && from.same_route(to)
    }

    /// Deliver immediately if reachable, otherwise enqueue.
    ///
    /// Fails with `QueueFull` when the destination queue is at capacity
    /// (`max_queue_size` of 0 means unlimited).
    #[instrument(skip(self, message), fields(message_id = %message.id, destination = %message.recipient))]
    pub fn send(
        &mut self,
        mut message: QueuedMessage,
        estimated_steps: u8,
    ) -> Result<SendReceipt, RouterError> {
        let destination = message.recipient;
        let key = destination.without_clock();

        if self.is_reachable(&message.sender, &destination) {
            message.deliverable = true;
            let depth = self.pending_for(&destination);
            events::message_delivered(&destination.to_string(), &message.id.to_string());
            return Ok(SendReceipt {
                message_id: message.id,
                mode: DeliveryMode::Immediate,
                destination,
                queue_depth: depth,
                estimated_steps,
                message: Some(message),
            });
        }

        let queue = self.queues.entry(key).or_default();
        if self.max_queue_size > 0 && queue.len() >= self.max_queue_size {
            return Err(RouterError::QueueFull {
                destination: destination.to_string(),
                capacity: self.max_queue_size,
            });
        }
        message.deliverable = false;
        let message_id = message.id;
        queue.push_back(message);
        let depth = queue.len();
        events::message_queued(&destination.to_string(), depth, estimated_steps);
        Ok(SendReceipt {
            message_id,
            mode: DeliveryMode::Queued,
            destination,
            queue_depth: depth,
            estimated_steps,
            message: None,
        })
    }

    /// Remove and return every message queued for `peer`, oldest first.
    #[instrument(skip(self))]
    pub fn drain(&mut self, peer: &NodeAddress) -> Vec<QueuedMessage> {
        let drained: Vec<QueuedMessage> = self
            .queues
            .remove(&peer.without_clock())
            .map(|q| {
                q.into_iter()
                    .map(|mut m| {
                        m.deliverable = true;
                        m
                    })
                    .collect()
            })
            .unwrap_or_default();
        debug!(count = drained.len(), "drained queue");
        drained
    }

    pub fn pending_for(&self, peer: &NodeAddress) -> usize {
        self.queues
            .get(&peer.without_clock())
            .map(VecDeque::len)
            .unwrap_or(0)
    }

    pub fn total_pending(&self) -> usize {
        self.queues.values().map(VecDeque::len).sum()
    }

    /// Queue depth per destination, keyed by address text.
    pub fn queue_depths(&self) -> BTreeMap<String, usize> {
        self.queues
            .iter()
            .map(|(addr, q)| (addr.to_string(), q.len()))
            .collect()
    }

    /// Copy of every queue, for export.
    pub fn snapshot_queues(&self) -> BTreeMap<NodeAddress, Vec<QueuedMessage>> {
        self.queues
            .iter()
            .map(|(addr, q)| (*addr, q.iter().cloned().collect()))
            .collect()
    }

    /// Replace all queues verbatim.
    pub fn restore_queues(&mut self, queues: BTreeMap<NodeAddress, Vec<QueuedMessage>>) {
        self.queues = queues
            .into_iter()
            .filter(|(_, q)| !q.is_empty())
            .map(|(addr, q)| (addr.without_clock(), q.into_iter().collect()))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::QuorumConfig;

    use crate::causal::CausalState;

    fn sender() -> CausalState {
        CausalState::initialize(1, &QuorumConfig::default(), None).unwrap()
    }

    fn foreign(node: u32) -> NodeAddress {
        NodeAddress::encode(0xaaaa, 1, node, 0).unwrap()
    }

    #[test]
    fn same_prefix_online_is_immediate() {
        let s = sender();
        let mut router = OfflineRouter::new(&RouterConfig::default());
        let to = NodeAddress::encode(s.address().prefix(), 1, 2, 0).unwrap();
        let receipt = router
            .send(QueuedMessage::from_snapshot(s.current(), to, b"hi".to_vec()), 0)
            .unwrap();
        assert_eq!(receipt.mode, DeliveryMode::Immediate);
        assert!(receipt.message.unwrap().deliverable);
        assert_eq!(router.total_pending(), 0);
    }

    #[test]
    fn foreign_prefix_is_queued_and_drained() {
        let s = sender();
        let mut router = OfflineRouter::new(&RouterConfig::default());
        for i in 0..3 {
            let receipt = router
                .send(QueuedMessage::from_snapshot(s.current(), foreign(2), vec![i]), 14)
                .unwrap();
            assert_eq!(receipt.mode, DeliveryMode::Queued);
            assert_eq!(receipt.queue_depth, usize::from(i) + 1);
        }
        // Clock bits do not split the queue.
        let later = NodeAddress::encode(0xaaaa, 1, 2, 99).unwrap();
        assert_eq!(router.pending_for(&later), 3);
        let drained = router.drain(&later);
        assert_eq!(drained.iter().map(|m| m.payload[0]).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert!(drained.iter().all(|m| m.deliverable));
        assert_eq!(router.pending_for(&later), 0);
    }

    #[test]
    fn offline_queues_even_same_prefix() {
        let s = sender();
        let mut router = OfflineRouter::new(&RouterConfig::default());
        router.set_online(false);
        let to = NodeAddress::encode(s.address().prefix(), 1, 2, 0).unwrap();
        let receipt = router
            .send(QueuedMessage::from_snapshot(s.current(), to, vec![]), 0)
            .unwrap();
        assert_eq!(receipt.mode, DeliveryMode::Queued);
    }

    #[test]
    fn full_queue_rejects() {
        let s = sender();
        let mut router = OfflineRouter::new(&RouterConfig {
            max_queue_size: 1,
            ..RouterConfig::default()
        });
        router
            .send(QueuedMessage::from_snapshot(s.current(), foreign(3), vec![]), 14)
            .unwrap();
        let err = router
            .send(QueuedMessage::from_snapshot(s.current(), foreign(3), vec![]), 14)
            .unwrap_err();
        assert!(matches!(err, RouterError::QueueFull { capacity: 1, .. }));
    }
}
