use crate::consensus::diff::FieldDiff;
use crate::consensus::types::{ConsensusMethod, QuorumStrategy};

const HYPEREDGE_STEPS: u8 = 7;

/// Uniform hypergraph whose edges are every `k`-subset of the schema.
///
/// Agrees when some edge is fully equal. A fully equal `k`-subset exists
/// exactly when at least `k` fields are equal, so edges are never
/// enumerated.
#[derive(Debug, Clone)]
pub struct UniformHyperedge {
    shape: Vec<usize>,
    edge_size: usize,
}

impl UniformHyperedge {
    pub fn new(field_count: usize, edge_size: usize) -> Self {
        Self {
            shape: (0..field_count).collect(),
            edge_size: edge_size.max(1),
        }
    }

    pub fn edge_size(&self) -> usize {
        self.edge_size
    }
}

impl QuorumStrategy for UniformHyperedge {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::Hyperedge
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn evaluate(&self, diff: &FieldDiff) -> Option<u8> {
        (self.edge_size <= self.shape.len() && diff.equal_within(&self.shape) >= self.edge_size)
            .then_some(HYPEREDGE_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_edge() {
        let h = UniformHyperedge::new(5, 2);
        assert_eq!(
            h.evaluate(&FieldDiff::from_flags(vec![false, false, true, false, true], 0)),
            Some(7)
        );
        assert_eq!(
            h.evaluate(&FieldDiff::from_flags(vec![false, false, false, false, true], 0)),
            None
        );
    }
}
