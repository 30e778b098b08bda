use serde::{Deserialize, Serialize};

use super::defaults;

/// Field layout of every block state and the roles fields play in quorum
/// strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Ordered field names. Order is part of the root digest.
    pub fields: Vec<String>,
    /// The three fields voted on by the triangle quorum.
    pub triangle: Vec<String>,
    /// The field checked by the single-field fallback.
    pub link_field: String,
    /// Size of each uniform hyperedge.
    pub hyperedge_size: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            fields: defaults::DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
            triangle: defaults::DEFAULT_TRIANGLE
                .iter()
                .map(|f| f.to_string())
                .collect(),
            link_field: defaults::DEFAULT_LINK_FIELD.to_string(),
            hyperedge_size: defaults::DEFAULT_HYPEREDGE_SIZE,
        }
    }
}
