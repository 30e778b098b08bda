//! MergeEngine: resolves the local causal state against one peer snapshot.
//!
//! Resolution order:
//!
//! 1. identical content: local kept
//! 2. peer chain contains the local root: fast-forward to the peer fields
//! 3. triangle, majority, or hyperedge agreement: local kept
//! 4. learner confidence above threshold: per-field blend
//! 5. peer strictly newer: last writer wins
//! 6. otherwise the merge fails and local is untouched
//!
//! Every attempt trains the learner. The engine never mutates the local
//! state; callers commit `new_state` on success.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use quorum_core::config::MergeConfig;
use quorum_core::errors::{QuorumResult, StateError};
use quorum_core::Digest;
use quorum_observability::events;

use super::learner::{FieldChoice, MergeLearner};
use super::result::{ConflictKind, MergeConflict, MergeResult, MergeStrategy};
use crate::block::{BlockState, ByteField};
use crate::causal::{CausalSnapshot, CausalState};
use crate::consensus::FieldDiff;

/// Reason reported when no rule resolves a divergence.
pub const CONCURRENT_MODIFICATIONS: &str = "concurrent modifications";

#[derive(Debug, Clone)]
pub struct MergeEngine {
    config: MergeConfig,
    learner: MergeLearner,
}

impl MergeEngine {
    pub fn new(config: MergeConfig, field_count: usize) -> Self {
        Self {
            config,
            learner: MergeLearner::new(field_count),
        }
    }

    pub fn with_learner(config: MergeConfig, learner: MergeLearner) -> Self {
        Self { config, learner }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn learner(&self) -> &MergeLearner {
        &self.learner
    }

    pub fn reset_learner(&mut self) {
        self.learner.reset();
    }

    /// Merge `peer` into `local`.
    ///
    /// `peer_ancestry` lists roots on the peer's chain (its own root first).
    /// Schema mismatches and peer blocks that fail verification are errors;
    /// every other outcome is a [`MergeResult`].
    #[instrument(skip_all, fields(node_id = local.node_id(), peer_root = %peer.root().short()))]
    pub fn merge(
        &mut self,
        local: &CausalState,
        peer: &CausalSnapshot,
        peer_ancestry: &[Digest],
    ) -> QuorumResult<MergeResult> {
        let peer_names = peer.block().field_names();
        if !local.schema().matches(&peer_names) {
            return Err(StateError::SchemaMismatch {
                expected: local.schema().len(),
                actual: peer_names.len(),
            }
            .into());
        }
        peer.block().verify()?;

        let current = Arc::clone(local.current());
        let diff = FieldDiff::between(current.block(), peer.block());
        let consensus = local.strategies().evaluate(&diff);
        let link = local.schema().link();
        let (local_ts, peer_ts) = (current.timestamp(), peer.timestamp());
        let changed = current.block().changed_fields(peer.block());
        let conflict = |kind| MergeConflict {
            fields: changed.clone(),
            kind,
            local_timestamp: local_ts,
            peer_timestamp: peer_ts,
        };

        let fast_forward = current.root() != peer.root() && peer_ancestry.contains(&current.root());
        let deterministic = diff.identical()
            || fast_forward
            || consensus.method.is_structural()
            || peer_ts > local_ts;
        let activation = self.learner.activate(&diff, link, &self.config);
        debug!(
            method = %consensus.method,
            steps = consensus.convergence_steps,
            confidence = activation.confidence,
            fast_forward,
            "merge inputs"
        );

        let outcome = if diff.identical() {
            Some((current.clone(), MergeStrategy::Quorum(consensus.method), Vec::new()))
        } else if fast_forward {
            let snapshot = local.successor(peer.block().fields().to_vec(), next_timestamp(local_ts, peer_ts)?)?;
            Some((Arc::new(snapshot), MergeStrategy::FastForward, Vec::new()))
        } else if consensus.method.is_structural() {
            Some((current.clone(), MergeStrategy::Quorum(consensus.method), Vec::new()))
        } else if activation.confidence > self.config.confidence_threshold {
            let fields = self.blend(current.block(), peer.block(), &diff);
            let snapshot = local.successor(fields, next_timestamp(local_ts, peer_ts)?)?;
            Some((
                Arc::new(snapshot),
                MergeStrategy::Adaptive,
                vec![conflict(ConflictKind::Adaptive)],
            ))
        } else if peer_ts > local_ts {
            let snapshot = local.successor(peer.block().fields().to_vec(), next_timestamp(local_ts, peer_ts)?)?;
            Some((
                Arc::new(snapshot),
                MergeStrategy::LastWriterWins,
                vec![conflict(ConflictKind::LastWriterWins)],
            ))
        } else {
            None
        };

        let peer_newer = match peer_ts.cmp(&local_ts) {
            Ordering::Greater => Some(true),
            Ordering::Less => Some(false),
            Ordering::Equal => None,
        };
        self.learner
            .train(&diff, link, deterministic, peer_newer, &self.config);

        let result = match outcome {
            Some((new_state, strategy_used, conflicts)) => {
                info!(
                    node_id = local.node_id(),
                    strategy = %strategy_used,
                    timestamp = new_state.timestamp(),
                    "merge succeeded"
                );
                events::merge_completed(
                    local.node_id(),
                    strategy_used.as_str(),
                    consensus.method.as_str(),
                    consensus.convergence_steps,
                    conflicts.len(),
                );
                MergeResult {
                    success: true,
                    new_state,
                    conflicts,
                    strategy_used,
                    consensus,
                    reason: None,
                }
            }
            None => {
                warn!(
                    node_id = local.node_id(),
                    local_ts,
                    peer_ts,
                    changed = ?changed,
                    "merge rejected"
                );
                events::merge_rejected(local.node_id(), CONCURRENT_MODIFICATIONS, local_ts, peer_ts);
                MergeResult {
                    conflicts: vec![conflict(ConflictKind::Unresolved)],
                    consensus,
                    ..MergeResult::failed(current, CONCURRENT_MODIFICATIONS)
                }
            }
        };
        Ok(result)
    }

    /// Equal fields come from local; differing fields follow the learner's
    /// preference, with ties going to the larger digest.
    fn blend(&self, local: &BlockState, peer: &BlockState, diff: &FieldDiff) -> Vec<ByteField> {
        local
            .fields()
            .iter()
            .zip(peer.fields())
            .enumerate()
            .map(|(i, (mine, theirs))| {
                if diff.is_equal(i) {
                    return mine.clone();
                }
                match self.learner.choice(i) {
                    FieldChoice::Local => mine.clone(),
                    FieldChoice::Peer => theirs.clone(),
                    FieldChoice::Tie if theirs.digest() > mine.digest() => theirs.clone(),
                    FieldChoice::Tie => mine.clone(),
                }
            })
            .collect()
    }
}

/// Successor timestamp: past local, never behind the peer.
fn next_timestamp(local: u64, peer: u64) -> Result<u64, StateError> {
    local
        .checked_add(1)
        .map(|next| next.max(peer))
        .ok_or(StateError::ClockExhausted(local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::errors::QuorumErrorCode;
    use quorum_core::QuorumConfig;

    use crate::consensus::ConsensusMethod;
    use crate::view::Endian;

    fn pair() -> (CausalState, CausalState) {
        let config = QuorumConfig::default();
        (
            CausalState::initialize(1, &config, None).unwrap(),
            CausalState::initialize(2, &config, None).unwrap(),
        )
    }

    fn engine() -> MergeEngine {
        MergeEngine::new(MergeConfig::default(), 5)
    }

    fn diverge(state: &mut CausalState, tag: &str) {
        for field in ["header", "payload", "metadata", "index", "link"] {
            state.update(field, format!("{tag}-{field}").as_bytes()).unwrap();
        }
    }

    #[test]
    fn identical_is_triangle_no_change() {
        let (a, b) = pair();
        let mut engine = engine();
        let result = engine.merge(&a, b.current(), &b.ancestry()).unwrap();
        assert!(result.success);
        assert_eq!(result.strategy_used, MergeStrategy::Quorum(ConsensusMethod::Triangle));
        assert_eq!(result.new_state.root(), a.root());
        assert_eq!(engine.learner().samples(), 1);
    }

    #[test]
    fn newer_divergent_peer_wins() {
        let (mut a, mut b) = pair();
        diverge(&mut a, "a");
        diverge(&mut b, "b");
        b.update("header", b"b-later").unwrap();
        let result = engine().merge(&a, b.current(), &[b.root()]).unwrap();
        assert!(result.success);
        assert_eq!(result.strategy_used, MergeStrategy::LastWriterWins);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.new_state.node_id(), 1);
        assert_eq!(result.new_state.timestamp(), 6);
        assert_eq!(result.new_state.previous_root(), a.root());
    }

    #[test]
    fn concurrent_divergence_fails_and_keeps_local() {
        let (mut a, mut b) = pair();
        diverge(&mut a, "a");
        diverge(&mut b, "b");
        let result = engine().merge(&a, b.current(), &[b.root()]).unwrap();
        assert!(!result.success);
        assert_eq!(result.reason.as_deref(), Some(CONCURRENT_MODIFICATIONS));
        assert_eq!(result.new_state.root(), a.root());
        assert_eq!(result.consensus.method, ConsensusMethod::None);
    }

    #[test]
    fn descendant_fast_forwards() {
        let (a, _) = pair();
        let mut branch = a.fork();
        branch.update("payload", b"work").unwrap();
        let result = engine().merge(&a, branch.current(), &branch.ancestry()).unwrap();
        assert_eq!(result.strategy_used, MergeStrategy::FastForward);
        assert_eq!(result.new_state.root(), branch.root());
        assert_eq!(result.new_state.timestamp(), 1);
    }

    #[test]
    fn confident_learner_blends_same_time_divergence() {
        let (mut a, mut trainer) = pair();
        let mut peer = CausalState::initialize(3, &QuorumConfig::default(), None).unwrap();
        diverge(&mut a, "a");
        diverge(&mut trainer, "b");
        trainer.update("header", b"b-later").unwrap();
        diverge(&mut peer, "c");

        let mut engine = engine();
        let target = FieldDiff::between(a.current().block(), peer.current().block());
        let threshold = engine.config().confidence_threshold;
        let mut rounds = 0;
        while engine.learner().activate(&target, 4, engine.config()).confidence <= threshold {
            let result = engine.merge(&a, trainer.current(), &[trainer.root()]).unwrap();
            assert!(result.success);
            rounds += 1;
            assert!(rounds < 500, "learner never became confident");
        }
        for field in 0..5 {
            assert_eq!(engine.learner().choice(field), FieldChoice::Peer);
        }

        assert_eq!(peer.timestamp(), a.timestamp());
        let result = engine.merge(&a, peer.current(), &[peer.root()]).unwrap();
        assert!(result.success);
        assert_eq!(result.strategy_used, MergeStrategy::Adaptive);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::Adaptive);
        assert_eq!(result.new_state.timestamp(), a.timestamp() + 1);
        assert_eq!(result.new_state.previous_root(), a.root());
        for field in peer.current().block().fields() {
            assert_eq!(
                result.new_state.block().field_bytes(field.name()),
                Some(field.bytes())
            );
        }
    }

    #[test]
    fn neutral_preference_breaks_ties_by_digest() {
        let (mut a, mut b) = pair();
        a.update("header", b"left").unwrap();
        a.update("payload", b"left").unwrap();
        b.update("header", b"right").unwrap();
        b.update("payload", b"right").unwrap();
        let (local, peer) = (a.current().block(), b.current().block());
        let diff = FieldDiff::between(local, peer);

        let engine = engine();
        assert_eq!(engine.learner().choice(0), FieldChoice::Tie);
        let blended = engine.blend(local, peer, &diff);
        for (i, field) in blended.iter().enumerate() {
            let (mine, theirs) = (&local.fields()[i], &peer.fields()[i]);
            let expected = if diff.is_equal(i) || mine.digest() > theirs.digest() {
                mine
            } else {
                theirs
            };
            assert_eq!(field.bytes(), expected.bytes(), "field {}", field.name());
        }
    }

    #[test]
    fn tampered_peer_is_an_error_and_trains_nothing() {
        let (a, mut b) = pair();
        b.update("payload", &[1; 8]).unwrap();
        b.current()
            .block()
            .view::<u32>("payload")
            .unwrap()
            .write(0, 7, Endian::Little)
            .unwrap();

        let mut engine = engine();
        let err = engine.merge(&a, b.current(), &b.ancestry()).unwrap_err();
        assert_eq!(err.error_code(), "CONSISTENCY_ERROR");
        assert_eq!(engine.learner().samples(), 0);
    }

    #[test]
    fn next_timestamp_never_regresses() {
        assert_eq!(next_timestamp(3, 1).unwrap(), 4);
        assert_eq!(next_timestamp(3, 9).unwrap(), 9);
        assert!(next_timestamp(u64::MAX, 0).is_err());
    }
}
