//! Configuration for the quorum sync engine.
//!
//! Every section is `#[serde(default)]`, so an empty TOML document yields the
//! compiled defaults from [`defaults`].
//!
//! # Examples
//!
//! ```
//! use quorum_core::config::QuorumConfig;
//!
//! let config = QuorumConfig::from_toml("[router]\nmax_queue_size = 8\n").unwrap();
//! assert_eq!(config.router.max_queue_size, 8);
//! assert_eq!(config.schema.fields.len(), 5);
//! ```

pub mod defaults;
pub mod merge_config;
pub mod node_config;
pub mod observability_config;
pub mod router_config;
pub mod schema_config;

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_SCHEMA_FIELDS, ROUTING_PREFIX_BITS};
use crate::errors::ConfigError;

pub use merge_config::MergeConfig;
pub use node_config::NodeConfig;
pub use observability_config::ObservabilityConfig;
pub use router_config::RouterConfig;
pub use schema_config::SchemaConfig;

/// Top-level configuration aggregating all sub-configs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuorumConfig {
    pub node: NodeConfig,
    pub schema: SchemaConfig,
    pub merge: MergeConfig,
    pub router: RouterConfig,
    pub observability: ObservabilityConfig,
}

impl QuorumConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: QuorumConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: QuorumConfig =
            toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
                path: "<string>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node.routing_prefix >> ROUTING_PREFIX_BITS != 0 {
            return Err(invalid("node.routing_prefix", "must fit in 48 bits"));
        }

        let schema = &self.schema;
        if schema.fields.len() < MIN_SCHEMA_FIELDS {
            return Err(invalid(
                "schema.fields",
                &format!("at least {MIN_SCHEMA_FIELDS} fields are required"),
            ));
        }
        let mut seen = HashSet::new();
        for name in &schema.fields {
            if name.is_empty() {
                return Err(invalid("schema.fields", "field names must be non-empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(invalid(
                    "schema.fields",
                    &format!("duplicate field name {name:?}"),
                ));
            }
        }

        if schema.triangle.len() != 3 {
            return Err(invalid("schema.triangle", "must name exactly 3 fields"));
        }
        let triangle: HashSet<&str> = schema.triangle.iter().map(String::as_str).collect();
        if triangle.len() != 3 {
            return Err(invalid("schema.triangle", "fields must be distinct"));
        }
        if let Some(missing) = schema.triangle.iter().find(|f| !seen.contains(f.as_str())) {
            return Err(invalid(
                "schema.triangle",
                &format!("{missing:?} is not a schema field"),
            ));
        }
        if !seen.contains(schema.link_field.as_str()) {
            return Err(invalid(
                "schema.link_field",
                &format!("{:?} is not a schema field", schema.link_field),
            ));
        }
        if schema.hyperedge_size == 0 || schema.hyperedge_size > schema.fields.len() {
            return Err(invalid(
                "schema.hyperedge_size",
                "must be between 1 and the number of fields",
            ));
        }

        let merge = &self.merge;
        if !(merge.confidence_threshold > 0.0 && merge.confidence_threshold <= 1.0) {
            return Err(invalid(
                "merge.confidence_threshold",
                "must be in (0.0, 1.0]",
            ));
        }
        if !(merge.learning_rate > 0.0 && merge.learning_rate <= 1.0) {
            return Err(invalid("merge.learning_rate", "must be in (0.0, 1.0]"));
        }
        if merge.activation_epsilon <= 0.0 {
            return Err(invalid("merge.activation_epsilon", "must be positive"));
        }
        if merge.max_activation_iterations == 0 {
            return Err(invalid(
                "merge.max_activation_iterations",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
