//! # quorum-sync
//!
//! Quorum-based causal state synchronization.
//!
//! Layers, leaves first:
//! - [`view`]: typed, atomic views over shared byte buffers
//! - [`block`]: multi-field snapshots chained by root digest
//! - [`address`]: 128-bit routable node addresses
//! - [`causal`]: snapshot history and causal comparison
//! - [`consensus`]: ordered quorum agreement strategies
//! - [`merge`]: merge engine and adaptive learner
//! - [`branch`]: named working copies
//! - [`router`]: offline message queues
//! - [`node`]: the combined node API
//!
//! # Examples
//!
//! ```
//! use quorum_core::QuorumConfig;
//! use quorum_sync::QuorumNode;
//!
//! let mut a = QuorumNode::new(1, QuorumConfig::default()).unwrap();
//! let mut b = QuorumNode::new(2, QuorumConfig::default()).unwrap();
//! b.update("link", b"v2").unwrap();
//!
//! let cmp = a.compare(b.current());
//! assert_eq!(cmp.dimensions_changed, vec!["link".to_string()]);
//!
//! let result = a.merge(b.current(), &b.state().ancestry()).unwrap();
//! assert!(result.success);
//! ```

pub mod address;
pub mod block;
pub mod branch;
pub mod causal;
pub mod consensus;
pub mod merge;
pub mod node;
pub mod router;
pub mod view;

pub use address::{AddressParts, NodeAddress};
pub use block::{BlockState, ByteField, FieldSchema};
pub use branch::{BranchManager, BranchPointer};
pub use causal::{CausalComparison, CausalRelation, CausalSnapshot, CausalState};
pub use consensus::{ConsensusMethod, ConsensusOutcome, FieldDiff, QuorumStrategy, QuorumStrategySet};
pub use merge::{MergeEngine, MergeLearner, MergeResult, MergeStrategy};
pub use node::{Diagnostics, PersistedState, QuorumNode, ReceiveReport, SyncReport};
pub use router::{DeliveryMode, OfflineRouter, QueuedMessage, SendReceipt};
pub use view::{BinaryView, Endian, Lane, SharedBuffer, U256};
