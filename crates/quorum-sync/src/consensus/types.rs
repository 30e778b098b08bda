//! Strategy trait and result types shared by the consensus layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use quorum_core::constants::MAX_CONVERGENCE_STEPS;

use super::diff::FieldDiff;

/// Which agreement rule produced a consensus outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusMethod {
    Triangle,
    MajorityFour,
    MajorityFive,
    Hyperedge,
    LinkFallback,
    None,
}

impl ConsensusMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triangle => "triangle",
            Self::MajorityFour => "majority_four",
            Self::MajorityFive => "majority_five",
            Self::Hyperedge => "hyperedge",
            Self::LinkFallback => "link_fallback",
            Self::None => "none",
        }
    }

    /// Methods whose agreement lets a merge keep the local snapshot as is.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Triangle | Self::MajorityFour | Self::MajorityFive | Self::Hyperedge
        )
    }
}

impl fmt::Display for ConsensusMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First agreeing method and its convergence-step cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    pub method: ConsensusMethod,
    pub convergence_steps: u8,
}

impl ConsensusOutcome {
    pub fn none() -> Self {
        Self {
            method: ConsensusMethod::None,
            convergence_steps: MAX_CONVERGENCE_STEPS,
        }
    }

    pub fn agreed(&self) -> bool {
        self.method != ConsensusMethod::None
    }
}

/// One agreement rule over a fixed shape of fields.
pub trait QuorumStrategy: Send + Sync + fmt::Debug {
    fn method(&self) -> ConsensusMethod;

    /// Field indices this strategy looks at.
    fn shape(&self) -> &[usize];

    /// Convergence steps if the rule agrees, `None` otherwise.
    fn evaluate(&self, diff: &FieldDiff) -> Option<u8>;
}
