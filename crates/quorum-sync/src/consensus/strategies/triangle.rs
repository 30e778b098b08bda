use crate::consensus::diff::FieldDiff;
use crate::consensus::types::{ConsensusMethod, QuorumStrategy};

const TRIANGLE_STEPS: u8 = 0;
const TRIANGLE_QUORUM: usize = 2;

/// Two of the triangle's three edges agree, with every other field equal.
///
/// An edge agrees when both of its vertices are equal, so two agreeing
/// edges share a vertex and cover all three. A single drifting vertex
/// breaks two edges and leaves the decision to the majority graphs.
#[derive(Debug, Clone)]
pub struct TriangleQuorum {
    shape: [usize; 3],
}

impl TriangleQuorum {
    pub fn new(shape: [usize; 3]) -> Self {
        Self { shape }
    }
}

impl QuorumStrategy for TriangleQuorum {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::Triangle
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn evaluate(&self, diff: &FieldDiff) -> Option<u8> {
        (diff.confined_to(&self.shape) && diff.agreeing_edges(&self.shape) >= TRIANGLE_QUORUM)
            .then_some(TRIANGLE_STEPS)
    }
}
