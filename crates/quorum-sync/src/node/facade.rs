//! QuorumNode: the public state-machine API over one causal state.
//!
//! Owns the causal state, the merge engine (and its learner), the branch
//! manager, and the offline router. Successful merges are committed here;
//! failed merges leave every piece of local state untouched.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use quorum_core::constants::{MAX_CONVERGENCE_STEPS, STATE_FORMAT_VERSION};
use quorum_core::errors::{PersistenceError, QuorumResult, RouterError, StateError};
use quorum_core::{Digest, QuorumConfig};
use quorum_observability::events;

use super::persistence::PersistedState;
use super::reports::{Diagnostics, ReceiveReport, SyncReport};
use crate::address::NodeAddress;
use crate::branch::{BranchManager, BranchPointer};
use crate::causal::{CausalComparison, CausalSnapshot, CausalState};
use crate::consensus::FieldDiff;
use crate::merge::{MergeEngine, MergeResult};
use crate::router::{OfflineRouter, QueuedMessage, SendReceipt};

#[derive(Debug)]
pub struct QuorumNode {
    config: QuorumConfig,
    state: CausalState,
    engine: MergeEngine,
    branches: BranchManager,
    router: OfflineRouter,
    /// Last snapshot seen from each peer, keyed by clockless address.
    known_peers: BTreeMap<NodeAddress, Arc<CausalSnapshot>>,
    synced: bool,
    branch_hints: Vec<String>,
}

impl QuorumNode {
    /// Node with empty genesis fields.
    pub fn new(node_id: u32, config: QuorumConfig) -> QuorumResult<Self> {
        Self::build(node_id, config, None)
    }

    /// Node whose genesis fields start from `initial`.
    pub fn with_fields(
        node_id: u32,
        config: QuorumConfig,
        initial: &BTreeMap<String, Vec<u8>>,
    ) -> QuorumResult<Self> {
        Self::build(node_id, config, Some(initial))
    }

    fn build(
        node_id: u32,
        config: QuorumConfig,
        initial: Option<&BTreeMap<String, Vec<u8>>>,
    ) -> QuorumResult<Self> {
        config.validate()?;
        let state = CausalState::initialize(node_id, &config, initial)?;
        let engine = MergeEngine::new(config.merge.clone(), state.schema().len());
        let router = OfflineRouter::new(&config.router);
        info!(node_id, address = %state.address(), "quorum node created");
        Ok(Self {
            config,
            state,
            engine,
            branches: BranchManager::new(),
            router,
            known_peers: BTreeMap::new(),
            synced: false,
            branch_hints: Vec::new(),
        })
    }

    pub fn update(&mut self, field: &str, bytes: &[u8]) -> QuorumResult<Arc<CausalSnapshot>> {
        let snapshot = self.state.update(field, bytes)?;
        self.synced = false;
        Ok(snapshot)
    }

    pub fn compare(&self, peer: &CausalSnapshot) -> CausalComparison {
        self.state.compare(peer)
    }

    /// Merge a peer snapshot, committing on success.
    pub fn merge(
        &mut self,
        peer: &CausalSnapshot,
        peer_ancestry: &[Digest],
    ) -> QuorumResult<MergeResult> {
        let _span = quorum_observability::merge_span!(self.state.node_id(), peer.root().short()).entered();
        let result = self.engine.merge(&self.state, peer, peer_ancestry)?;
        self.commit(&result)?;
        Ok(result)
    }

    /// Send `payload` with the current state to `to`.
    #[instrument(skip(self, payload), fields(node_id = self.state.node_id()))]
    pub fn send(&mut self, to: NodeAddress, payload: Vec<u8>) -> QuorumResult<SendReceipt> {
        let message = QueuedMessage::from_snapshot(self.state.current(), to, payload)
            .with_ancestry(self.state.ancestry(), self.config.router.ancestry_window);
        let steps = self.estimate_steps(&to);
        Ok(self.router.send(message, steps)?)
    }

    /// Compare, merge, and commit the state carried by `message`.
    ///
    /// Messages for another node, carrying a different field layout, or
    /// whose block fails verification are rejected before any state is
    /// touched.
    pub fn receive(&mut self, message: &QueuedMessage) -> QuorumResult<ReceiveReport> {
        let _span = quorum_observability::receive_span!(message.id, message.sender).entered();
        let local = self.state.address();
        if message.recipient.without_clock() != local.without_clock() {
            return Err(RouterError::Misaddressed {
                recipient: message.recipient.to_string(),
                local: local.to_string(),
            }
            .into());
        }
        let names = message.block.field_names();
        if !self.state.schema().matches(&names) {
            return Err(RouterError::SchemaMismatch {
                expected: self.state.schema().len(),
                actual: names.len(),
            }
            .into());
        }

        if let Err(err) = message.block.verify() {
            warn!(message_id = %message.id, sender = %message.sender, error = %err, "rejecting tampered message");
            events::consistency_failure(&message.block.root().to_hex(), &err.to_string());
            return Err(err.into());
        }

        let peer = Arc::new(message.snapshot());
        let comparison = self.state.compare(&peer);
        let merge = self.engine.merge(&self.state, &peer, message.ancestry())?;
        self.commit(&merge)?;
        self.known_peers
            .insert(message.sender.without_clock(), Arc::clone(&peer));
        debug!(
            relation = ?comparison.relation(),
            success = merge.success,
            "message received"
        );
        Ok(ReceiveReport {
            message_id: message.id,
            sender: message.sender,
            comparison,
            merge,
            payload: message.payload.clone(),
        })
    }

    pub fn fork(&mut self, name: &str) -> QuorumResult<BranchPointer> {
        let _span = quorum_observability::branch_span!(name).entered();
        Ok(self.branches.fork(name, &self.state)?)
    }

    pub fn update_branch(
        &mut self,
        name: &str,
        field: &str,
        bytes: &[u8],
    ) -> QuorumResult<Arc<CausalSnapshot>> {
        self.branches.update_branch(name, field, bytes)
    }

    /// Merge a branch back into the main state. The branch is kept.
    pub fn merge_branch(&mut self, name: &str) -> QuorumResult<MergeResult> {
        let _span = quorum_observability::branch_span!(name).entered();
        let result = self
            .branches
            .merge_branch(name, &self.state, &mut self.engine)?;
        self.commit(&result)?;
        Ok(result)
    }

    pub fn delete_branch(&mut self, name: &str) -> QuorumResult<()> {
        self.branches.delete_branch(name)?;
        self.branch_hints.retain(|hint| hint != name);
        Ok(())
    }

    pub fn branch(&self, name: &str) -> Option<&CausalState> {
        self.branches.branch(name)
    }

    pub fn branch_names(&self) -> Vec<String> {
        self.branches.names()
    }

    /// Drain every message queued for `peer` for handover to the transport.
    pub fn sync_with_peer(&mut self, peer: NodeAddress) -> SyncReport {
        let _span = quorum_observability::sync_span!(peer).entered();
        let messages = self.router.drain(&peer);
        self.synced = true;
        info!(peer = %peer, exchanged = messages.len(), "sync pass complete");
        events::peer_synced(&peer.to_string(), messages.len());
        SyncReport {
            peer,
            exchanged: messages.len(),
            messages,
        }
    }

    /// Look up a historical snapshot, verifying its digests first.
    pub fn resolve_pointer(&self, root: &Digest) -> QuorumResult<Option<Arc<CausalSnapshot>>> {
        self.state.resolve(root).inspect_err(|err| {
            events::consistency_failure(&root.to_hex(), &err.to_string());
        })
    }

    pub fn prune_history(&mut self, before_timestamp: u64) -> usize {
        self.state.prune(before_timestamp)
    }

    pub fn pending_for(&self, peer: &NodeAddress) -> usize {
        self.router.pending_for(peer)
    }

    pub fn set_online(&mut self, online: bool) {
        self.router.set_online(online);
    }

    pub fn is_online(&self) -> bool {
        self.router.is_online()
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn reset_learner(&mut self) {
        self.engine.reset_learner();
    }

    pub fn diagnostics(&self) -> Diagnostics {
        let consistency_failures: Vec<String> = self
            .state
            .verify_history()
            .into_iter()
            .map(|(root, err)| {
                events::consistency_failure(&root.to_hex(), &err.to_string());
                format!("{}: {err}", root.short())
            })
            .collect();
        Diagnostics {
            node_id: self.state.node_id(),
            address: self.state.address(),
            timestamp: self.state.timestamp(),
            root: self.state.root(),
            history_size: self.state.history_len(),
            queue_depths: self.router.queue_depths(),
            pending_total: self.router.total_pending(),
            branches: self.branches.names(),
            branch_hints: self.branch_hints.clone(),
            online: self.router.is_online(),
            synced: self.synced,
            chain: self.state.chain_health(),
            consistency_failures,
            learner: self.engine.learner().summary(),
        }
    }

    pub fn export_state(&self) -> PersistedState {
        let mut branch_names = self.branches.names();
        for hint in &self.branch_hints {
            if !branch_names.contains(hint) {
                branch_names.push(hint.clone());
            }
        }
        PersistedState {
            version: STATE_FORMAT_VERSION,
            node_id: self.state.node_id(),
            current: self.state.current().as_ref().clone(),
            history: self
                .state
                .history()
                .iter()
                .map(|(root, snapshots)| {
                    (*root, snapshots.values().map(|snap| snap.as_ref().clone()).collect())
                })
                .collect(),
            queues: self.router.snapshot_queues(),
            branch_names,
            learner: self.engine.learner().clone(),
            online: self.router.is_online(),
            synced: self.synced,
            exported_at: Utc::now(),
        }
    }

    pub fn export_json(&self) -> QuorumResult<String> {
        Ok(self.export_state().to_json()?)
    }

    /// Rebuild a node from exported state.
    ///
    /// History and queues are restored verbatim; the current snapshot must
    /// verify.
    pub fn import_state(config: QuorumConfig, persisted: PersistedState) -> QuorumResult<Self> {
        config.validate()?;
        if persisted.version != STATE_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                expected: STATE_FORMAT_VERSION,
                found: persisted.version,
            }
            .into());
        }
        let current_root = persisted.current.root();
        let stored = persisted
            .history
            .get(&current_root)
            .into_iter()
            .flatten()
            .find(|snap| snap.timestamp() == persisted.current.timestamp());
        if let Some(stored) = stored {
            if *stored != persisted.current {
                return Err(StateError::Consistency {
                    root: current_root.to_hex(),
                    details: "history entry differs from current snapshot".to_string(),
                }
                .into());
            }
        }
        let history_len: usize = persisted.history.values().map(Vec::len).sum();
        let state = CausalState::restore(
            persisted.node_id,
            &config,
            persisted.current,
            persisted.history,
        )
        .inspect_err(|err| {
            warn!(error = %err, "imported state failed verification");
            events::consistency_failure(&current_root.to_hex(), &err.to_string());
        })?;

        let engine = MergeEngine::with_learner(config.merge.clone(), persisted.learner);
        let mut router = OfflineRouter::new(&config.router);
        router.restore_queues(persisted.queues);
        router.set_online(persisted.online);
        events::state_imported(state.node_id(), history_len, router.total_pending());

        Ok(Self {
            config,
            state,
            engine,
            branches: BranchManager::new(),
            router,
            known_peers: BTreeMap::new(),
            synced: persisted.synced,
            branch_hints: persisted.branch_names,
        })
    }

    pub fn import_json(config: QuorumConfig, json: &str) -> QuorumResult<Self> {
        let persisted = PersistedState::from_json(json)?;
        Self::import_state(config, persisted)
    }

    pub fn config(&self) -> &QuorumConfig {
        &self.config
    }

    pub fn state(&self) -> &CausalState {
        &self.state
    }

    pub fn current(&self) -> &Arc<CausalSnapshot> {
        self.state.current()
    }

    pub fn node_id(&self) -> u32 {
        self.state.node_id()
    }

    pub fn address(&self) -> NodeAddress {
        self.state.address()
    }

    pub fn timestamp(&self) -> u64 {
        self.state.timestamp()
    }

    pub fn root(&self) -> Digest {
        self.state.root()
    }

    pub fn engine(&self) -> &MergeEngine {
        &self.engine
    }

    fn commit(&mut self, result: &MergeResult) -> QuorumResult<()> {
        if !result.success {
            return Ok(());
        }
        let before = self.state.root();
        self.state.commit(Arc::clone(&result.new_state))?;
        if self.state.root() != before {
            self.synced = false;
        }
        Ok(())
    }

    /// Cost against the last state seen from `peer`, or the maximum if the
    /// peer has never been heard from.
    fn estimate_steps(&self, peer: &NodeAddress) -> u8 {
        self.known_peers
            .get(&peer.without_clock())
            .map(|known| {
                let diff = FieldDiff::between(self.state.current().block(), known.block());
                self.state.strategies().evaluate(&diff).convergence_steps
            })
            .unwrap_or(MAX_CONVERGENCE_STEPS)
    }
}
