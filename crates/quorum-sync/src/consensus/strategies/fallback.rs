use quorum_core::constants::MAX_CONVERGENCE_STEPS;

use crate::consensus::diff::FieldDiff;
use crate::consensus::types::{ConsensusMethod, QuorumStrategy};

const FALLBACK_BASE_STEPS: u8 = 8;
const FALLBACK_MAX_PENALTY: u64 = 5;

/// Single linking field equal. Cost grows with the logical time apart.
#[derive(Debug, Clone)]
pub struct LinkFallback {
    shape: [usize; 1],
}

impl LinkFallback {
    pub fn new(link: usize) -> Self {
        Self { shape: [link] }
    }
}

impl QuorumStrategy for LinkFallback {
    fn method(&self) -> ConsensusMethod {
        ConsensusMethod::LinkFallback
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn evaluate(&self, diff: &FieldDiff) -> Option<u8> {
        if !diff.is_equal(self.shape[0]) {
            return None;
        }
        // Bounded by FALLBACK_MAX_PENALTY, so the cast cannot truncate.
        let penalty = diff.elapsed().min(FALLBACK_MAX_PENALTY) as u8;
        Some((FALLBACK_BASE_STEPS + penalty).min(MAX_CONVERGENCE_STEPS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_is_capped() {
        let f = LinkFallback::new(4);
        let flags = vec![false, false, false, false, true];
        assert_eq!(f.evaluate(&FieldDiff::from_flags(flags.clone(), 0)), Some(8));
        assert_eq!(f.evaluate(&FieldDiff::from_flags(flags.clone(), 2)), Some(10));
        assert_eq!(f.evaluate(&FieldDiff::from_flags(flags, 1_000)), Some(13));
    }

    #[test]
    fn link_mismatch() {
        let f = LinkFallback::new(4);
        assert_eq!(f.evaluate(&FieldDiff::from_flags(vec![true; 4], 0)), None);
    }
}
