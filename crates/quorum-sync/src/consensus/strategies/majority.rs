use crate::consensus::diff::FieldDiff;
use crate::consensus::types::{ConsensusMethod, QuorumStrategy};

const MAJORITY_QUORUM: usize = 3;

/// Complete graph over the first `size` fields.
///
/// Agrees when at least three edges have both endpoints equal, which takes
/// three matching vertices, and every field outside the graph is equal.
#[derive(Debug, Clone)]
pub struct MajorityGraph {
    method: ConsensusMethod,
    shape: Vec<usize>,
    steps: u8,
}

impl MajorityGraph {
    /// Four-vertex graph over fields 0..4.
    pub fn four() -> Self {
        Self {
            method: ConsensusMethod::MajorityFour,
            shape: (0..4).collect(),
            steps: 3,
        }
    }

    /// Five-vertex graph over fields 0..5.
    pub fn five() -> Self {
        Self {
            method: ConsensusMethod::MajorityFive,
            shape: (0..5).collect(),
            steps: 5,
        }
    }

    pub fn size(&self) -> usize {
        self.shape.len()
    }
}

impl QuorumStrategy for MajorityGraph {
    fn method(&self) -> ConsensusMethod {
        self.method
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn evaluate(&self, diff: &FieldDiff) -> Option<u8> {
        (diff.confined_to(&self.shape) && diff.agreeing_edges(&self.shape) >= MAJORITY_QUORUM)
            .then_some(self.steps)
    }
}
