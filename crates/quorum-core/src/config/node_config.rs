use serde::{Deserialize, Serialize};

use super::defaults;

/// Routing identity shared by every node in a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// 48-bit routing prefix. Peers sharing it are directly reachable.
    pub routing_prefix: u64,
    /// 16-bit subnet id.
    pub subnet: u16,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            routing_prefix: defaults::DEFAULT_ROUTING_PREFIX,
            subnet: defaults::DEFAULT_SUBNET,
        }
    }
}
