//! Shared fixtures for quorum tests and benches.
//!
//! Two halves: a loader for the golden JSON scenarios under the workspace
//! `test-fixtures/golden/` directory, and builders for configs, field sets,
//! and nodes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use quorum_core::config::{QuorumConfig, SchemaConfig};
use quorum_sync::{NodeAddress, QuorumNode};

/// Default field names in schema order.
pub const FIELDS: [&str; 5] = ["header", "payload", "metadata", "index", "link"];

/// Root directory of the workspace-level test-fixtures folder.
fn fixtures_root() -> PathBuf {
    // Walk up from whichever crate is running until the golden data is found.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);

    while !path.join("test-fixtures").join("golden").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures/golden from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// One row of `golden/consensus/strategy_ladder.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsensusCase {
    pub name: String,
    pub equal: Vec<bool>,
    pub elapsed: u64,
    pub method: String,
    pub steps: u8,
}

/// One row of `golden/merge/resolution_order.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct MergeCase {
    pub name: String,
    /// `(field, value)` updates applied to the local node.
    pub local: Vec<(String, String)>,
    pub peer: Vec<(String, String)>,
    pub success: bool,
    pub strategy: String,
    pub local_unchanged: bool,
}

#[derive(Debug, Deserialize)]
struct CaseFile<T> {
    cases: Vec<T>,
}

pub fn consensus_cases() -> Vec<ConsensusCase> {
    load_fixture::<CaseFile<ConsensusCase>>("golden/consensus/strategy_ladder.json").cases
}

pub fn merge_cases() -> Vec<MergeCase> {
    load_fixture::<CaseFile<MergeCase>>("golden/merge/resolution_order.json").cases
}

/// Default config, validated.
pub fn config() -> QuorumConfig {
    QuorumConfig::default()
}

/// Default config with a bounded per-destination queue.
pub fn config_with_queue(max_queue_size: usize) -> QuorumConfig {
    let mut config = QuorumConfig::default();
    config.router.max_queue_size = max_queue_size;
    config
}

/// Config over an arbitrary schema: triangle is the first three fields,
/// link is the last.
pub fn config_with_fields(fields: &[&str]) -> QuorumConfig {
    let mut config = QuorumConfig::default();
    config.schema = SchemaConfig {
        fields: fields.iter().map(|f| f.to_string()).collect(),
        triangle: fields.iter().take(3).map(|f| f.to_string()).collect(),
        link_field: fields.last().map(|f| f.to_string()).unwrap_or_default(),
        hyperedge_size: 2,
    };
    config
}

/// Deterministic contents for every default field.
pub fn initial_fields(seed: u8) -> BTreeMap<String, Vec<u8>> {
    FIELDS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let bytes: Vec<u8> = (0..8u8).map(|b| seed.wrapping_add(b).wrapping_mul(i as u8 + 1)).collect();
            (name.to_string(), bytes)
        })
        .collect()
}

/// Node with empty genesis fields.
pub fn node(node_id: u32) -> QuorumNode {
    QuorumNode::new(node_id, config()).expect("default config is valid")
}

/// Node seeded from [`initial_fields`].
pub fn seeded_node(node_id: u32, seed: u8) -> QuorumNode {
    QuorumNode::with_fields(node_id, config(), &initial_fields(seed)).expect("seeded node")
}

/// Apply `(field, value)` updates in order.
pub fn apply_updates(node: &mut QuorumNode, updates: &[(String, String)]) {
    for (field, value) in updates {
        node.update(field, value.as_bytes()).expect("fixture update");
    }
}

/// Overwrite every field with `tag`-derived bytes.
pub fn diverge_all(node: &mut QuorumNode, tag: &str) {
    for field in FIELDS {
        node.update(field, format!("{tag}:{field}").as_bytes())
            .expect("fixture update");
    }
}

/// Address of `node_id` on the default routing prefix (reachable).
pub fn local_peer(node_id: u32) -> NodeAddress {
    let node = config().node;
    NodeAddress::encode(node.routing_prefix, node.subnet, node_id, 0).expect("valid address")
}

/// Address of `node_id` on a different routing prefix (unreachable).
pub fn remote_peer(node_id: u32) -> NodeAddress {
    NodeAddress::encode(0x0bad_cafe_0000, 7, node_id, 0).expect("valid address")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn golden_files_exist() {
        for f in [
            "golden/consensus/strategy_ladder.json",
            "golden/merge/resolution_order.json",
        ] {
            assert!(fixture_exists(f), "Missing fixture: {}", f);
        }
    }

    #[test]
    fn golden_cases_parse() {
        assert!(!consensus_cases().is_empty());
        assert!(!merge_cases().is_empty());
    }

    #[test]
    fn custom_schema_is_valid() {
        let config = config_with_fields(&["a", "b", "c", "d"]);
        assert!(config.validate().is_ok());
    }
}
