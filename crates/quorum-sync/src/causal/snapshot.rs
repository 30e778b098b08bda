use serde::{Deserialize, Serialize};

use quorum_core::errors::StateError;
use quorum_core::Digest;

use crate::address::NodeAddress;
use crate::block::BlockState;

/// Immutable (identity, address, block) triple recorded in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CausalSnapshot {
    node_id: u32,
    address: NodeAddress,
    block: BlockState,
}

impl CausalSnapshot {
    pub fn new(node_id: u32, address: NodeAddress, block: BlockState) -> Self {
        Self {
            node_id,
            address,
            block,
        }
    }

    pub fn node_id(&self) -> u32 {
        self.node_id
    }

    pub fn address(&self) -> NodeAddress {
        self.address
    }

    pub fn block(&self) -> &BlockState {
        &self.block
    }

    pub fn timestamp(&self) -> u64 {
        self.block.timestamp()
    }

    pub fn root(&self) -> Digest {
        self.block.root()
    }

    pub fn previous_root(&self) -> Digest {
        self.block.previous_root()
    }

    /// Block consistency plus identity agreement between address and node.
    pub fn verify(&self) -> Result<(), StateError> {
        self.block.verify()?;
        if self.address.node_id() != self.node_id {
            return Err(StateError::Consistency {
                root: self.root().to_hex(),
                details: format!(
                    "address node id {} does not match snapshot node id {}",
                    self.address.node_id(),
                    self.node_id
                ),
            });
        }
        Ok(())
    }
}
