//! Resolved field schema: ordered names plus the index of every strategy role.

use quorum_core::config::SchemaConfig;
use quorum_core::errors::{ConfigError, QuorumResult, StateError};

/// Ordered field layout shared by every snapshot of a node.
///
/// Built from a validated [`SchemaConfig`]; role names are resolved to
/// positions once so strategies never look fields up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<String>,
    triangle: [usize; 3],
    link: usize,
    hyperedge_size: usize,
}

impl FieldSchema {
    /// Resolve a schema config. Role names must be schema fields.
    pub fn from_config(config: &SchemaConfig) -> QuorumResult<Self> {
        let index = |name: &str| {
            config
                .fields
                .iter()
                .position(|f| f == name)
                .ok_or_else(|| StateError::UnknownField(name.to_string()))
        };
        if config.triangle.len() != 3 {
            return Err(ConfigError::ValidationFailed {
                field: "schema.triangle".to_string(),
                message: "must name exactly 3 fields".to_string(),
            }
            .into());
        }
        let triangle = [
            index(&config.triangle[0])?,
            index(&config.triangle[1])?,
            index(&config.triangle[2])?,
        ];
        let link = index(&config.link_field)?;
        Ok(Self {
            fields: config.fields.clone(),
            triangle,
            link,
            hyperedge_size: config.hyperedge_size,
        })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.fields
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn triangle(&self) -> [usize; 3] {
        self.triangle
    }

    pub fn link(&self) -> usize {
        self.link
    }

    pub fn hyperedge_size(&self) -> usize {
        self.hyperedge_size
    }

    /// True if `names` lists exactly this schema's fields in order.
    pub fn matches(&self, names: &[&str]) -> bool {
        names.len() == self.fields.len() && names.iter().zip(&self.fields).all(|(a, b)| *a == b.as_str())
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        // Default field names and roles all come from the same constants.
        Self {
            fields: SchemaConfig::default().fields,
            triangle: [0, 1, 2],
            link: 4,
            hyperedge_size: SchemaConfig::default().hyperedge_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_default_config() {
        let resolved = FieldSchema::from_config(&SchemaConfig::default()).unwrap();
        assert_eq!(resolved, FieldSchema::default());
        assert_eq!(resolved.name(resolved.link()), Some("link"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let config = SchemaConfig {
            link_field: "missing".to_string(),
            ..SchemaConfig::default()
        };
        assert!(FieldSchema::from_config(&config).is_err());
    }
}
