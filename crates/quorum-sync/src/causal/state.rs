//! CausalState: a node's current snapshot plus its snapshot history.
//!
//! Every update produces a new immutable [`CausalSnapshot`]. The logical
//! timestamp is strictly monotonic within one state; the address clock
//! tracks it.
//!
//! Roots hash field contents only, so reverting a field recreates an
//! earlier root. History therefore keys snapshots by root and then by
//! timestamp, and the chain walk follows `(root, timestamp)` pairs.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use quorum_core::config::{NodeConfig, QuorumConfig};
use quorum_core::errors::{QuorumResult, StateError};
use quorum_core::Digest;

use super::comparison::CausalComparison;
use super::snapshot::CausalSnapshot;
use crate::address::NodeAddress;
use crate::block::{BlockState, ByteField, FieldSchema};
use crate::consensus::{FieldDiff, QuorumStrategySet};

/// Outcome of walking the hash chain back from the current root.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChainHealth {
    /// Snapshots visited, current included.
    pub length: usize,
    /// The walk ended on a snapshot whose predecessor is the genesis sentinel.
    pub reaches_genesis: bool,
    /// First predecessor root not present in history (pruned or never seen).
    pub broken_at: Option<Digest>,
}

/// Snapshots sharing one root, by timestamp.
pub type SnapshotsAt = BTreeMap<u64, Arc<CausalSnapshot>>;

/// Mutable head over an immutable snapshot history.
#[derive(Debug, Clone)]
pub struct CausalState {
    node_id: u32,
    node: NodeConfig,
    schema: Arc<FieldSchema>,
    strategies: Arc<QuorumStrategySet>,
    current: Arc<CausalSnapshot>,
    history: BTreeMap<Digest, SnapshotsAt>,
}

impl CausalState {
    /// Genesis state at timestamp 0.
    ///
    /// Fields absent from `initial` start empty; names outside the schema
    /// are rejected.
    pub fn initialize(
        node_id: u32,
        config: &QuorumConfig,
        initial: Option<&BTreeMap<String, Vec<u8>>>,
    ) -> QuorumResult<Self> {
        let schema = Arc::new(FieldSchema::from_config(&config.schema)?);
        let strategies = Arc::new(QuorumStrategySet::for_schema(&schema));
        Self::with_schema(node_id, config.node.clone(), schema, strategies, initial)
    }

    /// Genesis state over an already resolved schema and strategy set.
    pub fn with_schema(
        node_id: u32,
        node: NodeConfig,
        schema: Arc<FieldSchema>,
        strategies: Arc<QuorumStrategySet>,
        initial: Option<&BTreeMap<String, Vec<u8>>>,
    ) -> QuorumResult<Self> {
        if let Some(initial) = initial {
            if let Some(unknown) = initial.keys().find(|k| schema.index_of(k).is_none()) {
                return Err(StateError::UnknownField(unknown.clone()).into());
            }
        }
        let fields = schema
            .names()
            .iter()
            .map(|name| {
                let bytes = initial
                    .and_then(|m| m.get(name))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                ByteField::new(name.as_str(), bytes)
            })
            .collect();
        let block = BlockState::create(fields, None);
        let address = NodeAddress::for_timestamp(node.routing_prefix, node.subnet, node_id, 0)?;
        let current = Arc::new(CausalSnapshot::new(node_id, address, block));
        debug!(node_id, root = %current.root().short(), "causal state initialized");
        let mut state = Self {
            node_id,
            node,
            schema,
            strategies,
            current: Arc::clone(&current),
            history: BTreeMap::new(),
        };
        state.record(current);
        Ok(state)
    }

    /// Rebuild from persisted parts. The current snapshot is verified and
    /// (re)inserted into history; every other entry is kept under its
    /// persisted root and its own timestamp.
    pub fn restore(
        node_id: u32,
        config: &QuorumConfig,
        current: CausalSnapshot,
        history: BTreeMap<Digest, Vec<CausalSnapshot>>,
    ) -> QuorumResult<Self> {
        let schema = Arc::new(FieldSchema::from_config(&config.schema)?);
        let strategies = Arc::new(QuorumStrategySet::for_schema(&schema));
        let actual = current.block().fields().len();
        if actual != schema.len() {
            return Err(StateError::SchemaMismatch {
                expected: schema.len(),
                actual,
            }
            .into());
        }
        current.verify()?;
        if current.node_id() != node_id {
            return Err(StateError::Consistency {
                root: current.root().to_hex(),
                details: format!("snapshot belongs to node {}, not {}", current.node_id(), node_id),
            }
            .into());
        }
        let current = Arc::new(current);
        let history = history
            .into_iter()
            .map(|(root, snapshots)| {
                let at: SnapshotsAt = snapshots
                    .into_iter()
                    .map(|snapshot| (snapshot.timestamp(), Arc::new(snapshot)))
                    .collect();
                (root, at)
            })
            .collect();
        let mut state = Self {
            node_id,
            node: config.node.clone(),
            schema,
            strategies,
            current: Arc::clone(&current),
            history,
        };
        state.record(current);
        Ok(state)
    }

    /// Replace one field, advancing the logical clock by one.
    pub fn update(&mut self, field: &str, bytes: &[u8]) -> QuorumResult<Arc<CausalSnapshot>> {
        let block = self.current.block().update_field(field, bytes)?;
        let address = self.address_at(block.timestamp())?;
        let snapshot = Arc::new(CausalSnapshot::new(self.node_id, address, block));
        self.record(Arc::clone(&snapshot));
        self.current = Arc::clone(&snapshot);
        debug!(
            node_id = self.node_id,
            field,
            timestamp = snapshot.timestamp(),
            root = %snapshot.root().short(),
            "field updated"
        );
        Ok(snapshot)
    }

    /// Causal comparison of the current snapshot against `peer`.
    pub fn compare(&self, peer: &CausalSnapshot) -> CausalComparison {
        let local = self.current.block();
        let diff = FieldDiff::between(local, peer.block());
        let consensus = self.strategies.evaluate(&diff);
        let dimensions_changed: Vec<String> = diff
            .changed()
            .into_iter()
            .map(|i| {
                local
                    .fields()
                    .get(i)
                    .or_else(|| peer.block().fields().get(i))
                    .map(|f| f.name().to_string())
                    .unwrap_or_default()
            })
            .collect();

        if dimensions_changed.is_empty() {
            return CausalComparison {
                happens_before: false,
                happens_after: false,
                concurrent: false,
                dimensions_changed,
                consensus,
            };
        }

        let (happens_before, happens_after, concurrent) = if consensus.agreed() {
            (false, false, true)
        } else {
            let (lt, pt) = (local.timestamp(), peer.timestamp());
            (lt < pt, lt > pt, lt == pt)
        };
        CausalComparison {
            happens_before,
            happens_after,
            concurrent,
            dimensions_changed,
            consensus,
        }
    }

    /// Build (without committing) a successor of the current snapshot.
    pub fn successor(&self, fields: Vec<ByteField>, timestamp: u64) -> QuorumResult<CausalSnapshot> {
        if fields.len() != self.schema.len() {
            return Err(StateError::SchemaMismatch {
                expected: self.schema.len(),
                actual: fields.len(),
            }
            .into());
        }
        let block = BlockState::with_fields(fields, self.current.root(), timestamp);
        let address = self.address_at(timestamp)?;
        Ok(CausalSnapshot::new(self.node_id, address, block))
    }

    /// Make `snapshot` the current head.
    ///
    /// Committing the current root is a no-op. Any other commit must carry
    /// this node's identity and a strictly later timestamp.
    pub fn commit(&mut self, snapshot: Arc<CausalSnapshot>) -> QuorumResult<()> {
        if snapshot.root() == self.current.root() && snapshot.timestamp() == self.current.timestamp()
        {
            return Ok(());
        }
        if snapshot.node_id() != self.node_id {
            return Err(StateError::Consistency {
                root: snapshot.root().to_hex(),
                details: format!(
                    "snapshot belongs to node {}, not {}",
                    snapshot.node_id(),
                    self.node_id
                ),
            }
            .into());
        }
        if snapshot.timestamp() <= self.current.timestamp() {
            return Err(StateError::Consistency {
                root: snapshot.root().to_hex(),
                details: format!(
                    "timestamp {} does not advance past {}",
                    snapshot.timestamp(),
                    self.current.timestamp()
                ),
            }
            .into());
        }
        self.record(Arc::clone(&snapshot));
        self.current = snapshot;
        Ok(())
    }

    /// Drop history entries older than `before_timestamp`. The current
    /// snapshot is always kept. Returns the number removed.
    pub fn prune(&mut self, before_timestamp: u64) -> usize {
        let (current_root, current_ts) = (self.current.root(), self.current.timestamp());
        let before = self.history_len();
        self.history.retain(|root, snapshots| {
            snapshots.retain(|ts, _| {
                (*root == current_root && *ts == current_ts) || *ts >= before_timestamp
            });
            !snapshots.is_empty()
        });
        let removed = before - self.history_len();
        debug!(node_id = self.node_id, before_timestamp, removed, "history pruned");
        removed
    }

    /// Roots from the current snapshot back along `previous_root` links,
    /// current first. Stops at the genesis sentinel or at a predecessor
    /// missing from history. A reverted root appears once per visit.
    pub fn ancestry(&self) -> Vec<Digest> {
        self.walk_chain().0
    }

    pub fn descends_from(&self, root: &Digest) -> bool {
        self.ancestry().contains(root)
    }

    pub fn chain_health(&self) -> ChainHealth {
        let (roots, end) = self.walk_chain();
        ChainHealth {
            length: roots.len(),
            reaches_genesis: end.is_genesis(),
            broken_at: (!end.is_genesis()).then_some(end),
        }
    }

    /// Consistency failures across the whole history, keyed by root.
    pub fn verify_history(&self) -> Vec<(Digest, StateError)> {
        let mut failures = Vec::new();
        let entries = self
            .history
            .iter()
            .flat_map(|(root, snapshots)| snapshots.values().map(move |s| (root, s)));
        for (root, snapshot) in entries {
            if let Err(err) = snapshot.verify() {
                failures.push((*root, err));
            } else if snapshot.root() != *root {
                failures.push((
                    *root,
                    StateError::Consistency {
                        root: root.to_hex(),
                        details: format!("history key does not match root {}", snapshot.root()),
                    },
                ));
            }
        }
        if !failures.is_empty() {
            warn!(node_id = self.node_id, failures = failures.len(), "history consistency failures");
        }
        failures
    }

    /// Latest snapshot recorded under `root`, verified before it is
    /// returned.
    pub fn resolve(&self, root: &Digest) -> QuorumResult<Option<Arc<CausalSnapshot>>> {
        let latest = self
            .history
            .get(root)
            .and_then(|snapshots| snapshots.values().next_back());
        match latest {
            None => Ok(None),
            Some(snapshot) => {
                if let Err(err) = snapshot.verify() {
                    warn!(root = %root.short(), error = %err, "resolved snapshot failed verification");
                    return Err(err.into());
                }
                if snapshot.root() != *root {
                    return Err(StateError::Consistency {
                        root: root.to_hex(),
                        details: format!("history key does not match root {}", snapshot.root()),
                    }
                    .into());
                }
                Ok(Some(Arc::clone(snapshot)))
            }
        }
    }

    /// Independent copy of the current snapshot with freshly allocated bytes.
    pub fn fork(&self) -> CausalState {
        let block = self.current.block().clone();
        let current = Arc::new(CausalSnapshot::new(
            self.node_id,
            self.current.address(),
            block,
        ));
        let mut forked = Self {
            node_id: self.node_id,
            node: self.node.clone(),
            schema: Arc::clone(&self.schema),
            strategies: Arc::clone(&self.strategies),
            current: Arc::clone(&current),
            history: BTreeMap::new(),
        };
        forked.record(current);
        forked
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn node_config(&self) -> &NodeConfig {
        &self.node
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    pub fn strategies(&self) -> &QuorumStrategySet {
        &self.strategies
    }

    pub fn current(&self) -> &Arc<CausalSnapshot> {
        &self.current
    }

    pub fn timestamp(&self) -> u64 {
        self.current.timestamp()
    }

    pub fn root(&self) -> Digest {
        self.current.root()
    }

    pub fn address(&self) -> NodeAddress {
        self.current.address()
    }

    pub fn history(&self) -> &BTreeMap<Digest, SnapshotsAt> {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.values().map(BTreeMap::len).sum()
    }

    fn record(&mut self, snapshot: Arc<CausalSnapshot>) {
        self.history
            .entry(snapshot.root())
            .or_default()
            .insert(snapshot.timestamp(), snapshot);
    }

    fn address_at(&self, timestamp: u64) -> QuorumResult<NodeAddress> {
        Ok(NodeAddress::for_timestamp(
            self.node.routing_prefix,
            self.node.subnet,
            self.node_id,
            timestamp,
        )?)
    }

    /// Walk back from the current snapshot. Each step moves to a strictly
    /// older timestamp, so the walk always terminates.
    fn walk_chain(&self) -> (Vec<Digest>, Digest) {
        let mut roots = Vec::new();
        let mut cursor = Some(Arc::clone(&self.current));
        let mut end = self.current.root();
        while let Some(snapshot) = cursor {
            roots.push(snapshot.root());
            end = snapshot.previous_root();
            if end.is_genesis() {
                break;
            }
            cursor = self.predecessor(&snapshot);
        }
        (roots, end)
    }

    /// Latest snapshot under `snapshot`'s previous root that is older than it.
    fn predecessor(&self, snapshot: &CausalSnapshot) -> Option<Arc<CausalSnapshot>> {
        self.history
            .get(&snapshot.previous_root())?
            .range(..snapshot.timestamp())
            .next_back()
            .map(|(_, older)| Arc::clone(older))
    }
}
