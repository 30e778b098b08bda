//! Named working copies of a causal state.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use quorum_core::errors::{BranchError, QuorumResult};
use quorum_core::Digest;
use quorum_observability::events;

use crate::causal::{CausalSnapshot, CausalState};
use crate::merge::{MergeEngine, MergeResult};

const MAX_BRANCH_NAME: usize = 256;

/// Where a branch started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPointer {
    pub name: String,
    pub root: Digest,
    pub timestamp: u64,
}

/// Registry of branches keyed by name.
#[derive(Debug, Clone, Default)]
pub struct BranchManager {
    branches: BTreeMap<String, CausalState>,
}

impl BranchManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-copy `parent` into a new branch.
    pub fn fork(&mut self, name: &str, parent: &CausalState) -> Result<BranchPointer, BranchError> {
        validate_name(name)?;
        if self.branches.contains_key(name) {
            return Err(BranchError::AlreadyExists(name.to_string()));
        }
        let branch = parent.fork();
        let pointer = BranchPointer {
            name: name.to_string(),
            root: branch.root(),
            timestamp: branch.timestamp(),
        };
        self.branches.insert(name.to_string(), branch);
        info!(branch = name, root = %pointer.root.short(), "branch forked");
        events::branch_forked(name, &pointer.root.to_hex(), pointer.timestamp);
        Ok(pointer)
    }

    pub fn update_branch(
        &mut self,
        name: &str,
        field: &str,
        bytes: &[u8],
    ) -> QuorumResult<Arc<CausalSnapshot>> {
        let branch = self
            .branches
            .get_mut(name)
            .ok_or_else(|| BranchError::NotFound(name.to_string()))?;
        let snapshot = branch.update(field, bytes)?;
        debug!(branch = name, field, timestamp = snapshot.timestamp(), "branch updated");
        Ok(snapshot)
    }

    /// Merge branch `name` into `target`. The branch is kept.
    ///
    /// A missing branch is a failed result, not an error.
    pub fn merge_branch(
        &self,
        name: &str,
        target: &CausalState,
        engine: &mut MergeEngine,
    ) -> QuorumResult<MergeResult> {
        let Some(branch) = self.branches.get(name) else {
            debug!(branch = name, "merge of unknown branch");
            return Ok(MergeResult::failed(
                Arc::clone(target.current()),
                BranchError::NotFound(name.to_string()).to_string(),
            ));
        };
        let result = engine.merge(target, branch.current(), &branch.ancestry())?;
        events::branch_merged(name, result.success, result.strategy_used.as_str());
        Ok(result)
    }

    pub fn delete_branch(&mut self, name: &str) -> Result<CausalState, BranchError> {
        let removed = self
            .branches
            .remove(name)
            .ok_or_else(|| BranchError::NotFound(name.to_string()))?;
        info!(branch = name, "branch deleted");
        Ok(removed)
    }

    pub fn branch(&self, name: &str) -> Option<&CausalState> {
        self.branches.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

fn validate_name(name: &str) -> Result<(), BranchError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_BRANCH_NAME
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '/'));
    if valid {
        Ok(())
    } else {
        Err(BranchError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quorum_core::QuorumConfig;

    use crate::merge::MergeStrategy;

    fn main_state() -> CausalState {
        CausalState::initialize(1, &QuorumConfig::default(), None).unwrap()
    }

    #[test]
    fn fork_twice_fails() {
        let main = main_state();
        let mut branches = BranchManager::new();
        branches.fork("feature", &main).unwrap();
        assert_eq!(
            branches.fork("feature", &main),
            Err(BranchError::AlreadyExists("feature".to_string()))
        );
    }

    #[test]
    fn invalid_names_rejected() {
        let main = main_state();
        let mut branches = BranchManager::new();
        for bad in ["", "has space", "semi;colon"] {
            assert!(matches!(
                branches.fork(bad, &main),
                Err(BranchError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn branch_updates_do_not_touch_parent() {
        let main = main_state();
        let mut branches = BranchManager::new();
        branches.fork("feature", &main).unwrap();
        branches.update_branch("feature", "payload", b"draft").unwrap();
        assert_eq!(main.timestamp(), 0);
        assert_eq!(branches.branch("feature").unwrap().timestamp(), 1);
    }

    #[test]
    fn merge_missing_branch_is_failed_result() {
        let main = main_state();
        let branches = BranchManager::new();
        let mut engine = MergeEngine::new(Default::default(), 5);
        let result = branches.merge_branch("ghost", &main, &mut engine).unwrap();
        assert!(!result.success);
        assert_eq!(result.strategy_used, MergeStrategy::Unresolved);
        assert_eq!(result.new_state.root(), main.root());
    }

    #[test]
    fn update_missing_branch_errors() {
        let mut branches = BranchManager::new();
        assert!(branches.update_branch("ghost", "payload", b"x").is_err());
        assert!(branches.delete_branch("ghost").is_err());
    }
}
