//! Quorum consensus: an ordered set of agreement rules of increasing cost.
//!
//! The first strategy that agrees decides the method and its convergence
//! step cost. If none agrees the outcome is [`ConsensusMethod::None`] at the
//! maximum cost.
//!
//! # Examples
//!
//! ```
//! use quorum_sync::block::FieldSchema;
//! use quorum_sync::consensus::{ConsensusMethod, FieldDiff, QuorumStrategySet};
//!
//! let set = QuorumStrategySet::for_schema(&FieldSchema::default());
//! let outcome = set.evaluate(&FieldDiff::from_flags(vec![true, true, true, false, true], 0));
//! assert_eq!(outcome.method, ConsensusMethod::MajorityFour);
//! assert_eq!(outcome.convergence_steps, 3);
//! ```

pub mod diff;
pub mod strategies;
pub mod types;

use tracing::debug;

use crate::block::FieldSchema;

pub use diff::FieldDiff;
pub use strategies::{LinkFallback, MajorityGraph, TriangleQuorum, UniformHyperedge};
pub use types::{ConsensusMethod, ConsensusOutcome, QuorumStrategy};

/// Ordered strategy list resolved against one schema.
#[derive(Debug)]
pub struct QuorumStrategySet {
    strategies: Vec<Box<dyn QuorumStrategy>>,
}

impl QuorumStrategySet {
    /// Default ordering: triangle, majority-4, majority-5, hyperedge, link.
    ///
    /// Majority graphs are skipped when the schema has fewer fields than
    /// their vertex count.
    pub fn for_schema(schema: &FieldSchema) -> Self {
        let mut strategies: Vec<Box<dyn QuorumStrategy>> =
            vec![Box::new(TriangleQuorum::new(schema.triangle()))];
        for graph in [MajorityGraph::four(), MajorityGraph::five()] {
            if schema.len() >= graph.size() {
                strategies.push(Box::new(graph));
            }
        }
        strategies.push(Box::new(UniformHyperedge::new(
            schema.len(),
            schema.hyperedge_size(),
        )));
        strategies.push(Box::new(LinkFallback::new(schema.link())));
        Self { strategies }
    }

    /// Custom ordering.
    pub fn with_strategies(strategies: Vec<Box<dyn QuorumStrategy>>) -> Self {
        Self { strategies }
    }

    /// First agreeing strategy wins.
    pub fn evaluate(&self, diff: &FieldDiff) -> ConsensusOutcome {
        for strategy in &self.strategies {
            if let Some(steps) = strategy.evaluate(diff) {
                debug!(method = %strategy.method(), steps, "quorum agreement");
                return ConsensusOutcome {
                    method: strategy.method(),
                    convergence_steps: steps,
                };
            }
        }
        debug!(changed = ?diff.changed(), "no quorum agreement");
        ConsensusOutcome::none()
    }

    pub fn methods(&self) -> Vec<ConsensusMethod> {
        self.strategies.iter().map(|s| s.method()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::config::SchemaConfig;

    fn default_set() -> QuorumStrategySet {
        QuorumStrategySet::for_schema(&FieldSchema::default())
    }

    #[test]
    fn identical_is_triangle_at_zero() {
        let outcome = default_set().evaluate(&FieldDiff::from_flags(vec![true; 5], 0));
        assert_eq!(outcome.method, ConsensusMethod::Triangle);
        assert_eq!(outcome.convergence_steps, 0);
    }

    #[test]
    fn link_drift_is_majority_five() {
        let outcome =
            default_set().evaluate(&FieldDiff::from_flags(vec![true, true, true, true, false], 0));
        assert_eq!(outcome.method, ConsensusMethod::MajorityFive);
        assert_eq!(outcome.convergence_steps, 5);
    }

    #[test]
    fn scattered_drift_falls_to_hyperedge() {
        let outcome = default_set()
            .evaluate(&FieldDiff::from_flags(vec![false, false, true, false, true], 0));
        assert_eq!(outcome.method, ConsensusMethod::Hyperedge);
    }

    #[test]
    fn only_link_equal_uses_fallback() {
        let outcome = default_set()
            .evaluate(&FieldDiff::from_flags(vec![false, false, false, false, true], 3));
        assert_eq!(outcome.method, ConsensusMethod::LinkFallback);
        assert_eq!(outcome.convergence_steps, 11);
    }

    #[test]
    fn total_divergence_is_none_at_max() {
        let outcome = default_set().evaluate(&FieldDiff::from_flags(vec![false; 5], 9));
        assert_eq!(outcome, ConsensusOutcome::none());
        assert_eq!(outcome.convergence_steps, 14);
    }

    #[test]
    fn small_schema_skips_majority_graphs() {
        let config = SchemaConfig {
            fields: vec!["a".into(), "b".into(), "c".into()],
            triangle: vec!["a".into(), "b".into(), "c".into()],
            link_field: "c".into(),
            hyperedge_size: 2,
        };
        let schema = FieldSchema::from_config(&config).unwrap();
        let set = QuorumStrategySet::for_schema(&schema);
        assert_eq!(
            set.methods(),
            vec![
                ConsensusMethod::Triangle,
                ConsensusMethod::Hyperedge,
                ConsensusMethod::LinkFallback
            ]
        );
    }
}
