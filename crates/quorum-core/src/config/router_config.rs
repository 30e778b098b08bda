use serde::{Deserialize, Serialize};

use super::defaults;

/// Offline router settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Maximum queued messages per destination (0 = unlimited).
    pub max_queue_size: usize,
    /// Whether a freshly built node starts online.
    pub start_online: bool,
    /// Chain roots carried per message, newest first (0 = whole chain).
    pub ancestry_window: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_queue_size: defaults::DEFAULT_MAX_QUEUE_SIZE,
            start_online: defaults::DEFAULT_START_ONLINE,
            ancestry_window: defaults::DEFAULT_ANCESTRY_WINDOW,
        }
    }
}
