use quorum_core::config::*;
use quorum_core::errors::ConfigError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = QuorumConfig::from_toml("").unwrap();

    // Node defaults
    assert_eq!(config.node.routing_prefix, 0xfd00_0000_0000);
    assert_eq!(config.node.subnet, 1);

    // Schema defaults
    assert_eq!(
        config.schema.fields,
        vec!["header", "payload", "metadata", "index", "link"]
    );
    assert_eq!(config.schema.triangle, vec!["header", "payload", "metadata"]);
    assert_eq!(config.schema.link_field, "link");
    assert_eq!(config.schema.hyperedge_size, 2);

    // Merge defaults
    assert_eq!(config.merge.confidence_threshold, 0.85);
    assert_eq!(config.merge.max_activation_iterations, 32);

    // Router defaults
    assert_eq!(config.router.max_queue_size, 10_000);
    assert!(config.router.start_online);
    assert_eq!(config.router.ancestry_window, 1024);

    // Observability defaults
    assert_eq!(config.observability.log_level, "info");
    assert!(config.observability.json_logs);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[node]
subnet = 7

[schema]
fields = ["a", "b", "c", "d"]
triangle = ["b", "c", "d"]
link_field = "a"

[router]
start_online = false
"#;
    let config = QuorumConfig::from_toml(toml).unwrap();
    assert_eq!(config.node.subnet, 7);
    assert_eq!(config.node.routing_prefix, 0xfd00_0000_0000); // default
    assert_eq!(config.schema.fields.len(), 4);
    assert_eq!(config.schema.link_field, "a");
    assert!(!config.router.start_online);
    assert_eq!(config.router.max_queue_size, 10_000); // default
}

#[test]
fn config_serde_roundtrip() {
    let config = QuorumConfig::default();
    let toml_str = config.to_toml().unwrap();
    let roundtripped = QuorumConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped, config);
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quorum.toml");
    std::fs::write(&path, "[merge]\nconfidence_threshold = 0.9\n").unwrap();
    let config = QuorumConfig::load(&path).unwrap();
    assert_eq!(config.merge.confidence_threshold, 0.9);
}

#[test]
fn config_load_missing_file() {
    let err = QuorumConfig::load(std::path::Path::new("/nonexistent/quorum.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileNotFound { .. }));
}

#[test]
fn config_rejects_invalid_toml() {
    let err = QuorumConfig::from_toml("[node\nsubnet = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

fn validation_field(toml: &str) -> String {
    match QuorumConfig::from_toml(toml).unwrap_err() {
        ConfigError::ValidationFailed { field, .. } => field,
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[test]
fn config_rejects_wide_routing_prefix() {
    assert_eq!(
        validation_field("[node]\nrouting_prefix = 281474976710656\n"),
        "node.routing_prefix"
    );
}

#[test]
fn config_rejects_small_or_duplicate_schema() {
    assert_eq!(
        validation_field("[schema]\nfields = [\"a\", \"b\"]\n"),
        "schema.fields"
    );
    assert_eq!(
        validation_field(
            "[schema]\nfields = [\"a\", \"a\", \"b\"]\ntriangle = [\"a\", \"b\", \"c\"]\nlink_field = \"a\"\n"
        ),
        "schema.fields"
    );
}

#[test]
fn config_rejects_triangle_outside_schema() {
    assert_eq!(
        validation_field("[schema]\ntriangle = [\"header\", \"payload\", \"nope\"]\n"),
        "schema.triangle"
    );
    assert_eq!(
        validation_field("[schema]\ntriangle = [\"header\", \"header\", \"payload\"]\n"),
        "schema.triangle"
    );
}

#[test]
fn config_rejects_unknown_link_and_bad_hyperedge() {
    assert_eq!(
        validation_field("[schema]\nlink_field = \"missing\"\n"),
        "schema.link_field"
    );
    assert_eq!(
        validation_field("[schema]\nhyperedge_size = 0\n"),
        "schema.hyperedge_size"
    );
    assert_eq!(
        validation_field("[schema]\nhyperedge_size = 6\n"),
        "schema.hyperedge_size"
    );
}

#[test]
fn config_rejects_bad_merge_tuning() {
    assert_eq!(
        validation_field("[merge]\nconfidence_threshold = 1.5\n"),
        "merge.confidence_threshold"
    );
    assert_eq!(
        validation_field("[merge]\nlearning_rate = 0.0\n"),
        "merge.learning_rate"
    );
    assert_eq!(
        validation_field("[merge]\nmax_activation_iterations = 0\n"),
        "merge.max_activation_iterations"
    );
}
