//! Position-wise field agreement between two snapshots.

use crate::block::BlockState;

/// Per-field equality flags plus the logical time between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    equal: Vec<bool>,
    elapsed: u64,
}

impl FieldDiff {
    /// Compare digests position by position. A field missing on either side
    /// counts as unequal.
    pub fn between(local: &BlockState, peer: &BlockState) -> Self {
        let width = local.fields().len().max(peer.fields().len());
        let equal = (0..width)
            .map(|i| {
                match (local.field_digests().get(i), peer.field_digests().get(i)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            })
            .collect();
        Self {
            equal,
            elapsed: local.timestamp().abs_diff(peer.timestamp()),
        }
    }

    pub fn from_flags(equal: Vec<bool>, elapsed: u64) -> Self {
        Self { equal, elapsed }
    }

    pub fn len(&self) -> usize {
        self.equal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equal.is_empty()
    }

    pub fn is_equal(&self, index: usize) -> bool {
        self.equal.get(index).copied().unwrap_or(false)
    }

    /// Absolute logical timestamp difference.
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn identical(&self) -> bool {
        self.equal.iter().all(|e| *e)
    }

    /// Number of equal fields in the whole set.
    pub fn equal_count(&self) -> usize {
        self.equal.iter().filter(|e| **e).count()
    }

    /// Number of equal fields among `shape`.
    pub fn equal_within(&self, shape: &[usize]) -> usize {
        shape.iter().filter(|i| self.is_equal(**i)).count()
    }

    /// Number of edges in the complete graph over `shape` whose two
    /// endpoints are both equal.
    pub fn agreeing_edges(&self, shape: &[usize]) -> usize {
        let k = self.equal_within(shape);
        k * k.saturating_sub(1) / 2
    }

    /// True if every field outside `shape` is equal.
    pub fn confined_to(&self, shape: &[usize]) -> bool {
        self.equal
            .iter()
            .enumerate()
            .all(|(i, eq)| *eq || shape.contains(&i))
    }

    /// Indices of differing fields.
    pub fn changed(&self) -> Vec<usize> {
        self.equal
            .iter()
            .enumerate()
            .filter(|(_, eq)| !**eq)
            .map(|(i, _)| i)
            .collect()
    }
}
