//! Source and destination field mapping
//!
//! The marker, endpoint, and metadata field names are internals of the
//! source store, and the partition key field is chosen per destination
//! collection. None of them are hardcoded; deployments override the
//! defaults through a TOML file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, MigrationResult};

/// Field names the classifier and transformer operate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Boolean marker distinguishing edge documents from vertex documents
    pub edge_marker: String,
    /// Destination partition key field, also the source field it is lifted
    /// from
    pub partition_key: String,
    /// Out-vertex (source endpoint) id field on edge documents
    pub out_vertex_id: String,
    /// In-vertex (sink endpoint) id field on edge documents
    pub in_vertex_id: String,
    /// Out-vertex label field on edge documents
    pub out_vertex_label: String,
    /// In-vertex label field on edge documents
    pub in_vertex_label: String,
    /// Store-internal metadata fields never copied as properties
    pub metadata: Vec<String>,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            edge_marker: "_isEdge".to_string(),
            partition_key: "partitionKey".to_string(),
            out_vertex_id: "_vertexId".to_string(),
            in_vertex_id: "_sink".to_string(),
            out_vertex_label: "_vertexLabel".to_string(),
            in_vertex_label: "_sinkLabel".to_string(),
            metadata: ["_rid", "_etag", "_self", "_ts", "_attachments"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl FieldNames {
    /// Load a field mapping from a TOML file. Fields absent from the file
    /// keep their defaults.
    pub fn load(path: &Path) -> MigrationResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| MigrationError::InvalidConfig(e.to_string()))
    }

    /// Whether `name` is a store-internal metadata field.
    #[must_use]
    pub fn is_metadata(&self, name: &str) -> bool {
        self.metadata.iter().any(|m| m == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_store_internals() {
        let fields = FieldNames::default();
        assert_eq!(fields.edge_marker, "_isEdge");
        assert_eq!(fields.out_vertex_id, "_vertexId");
        assert_eq!(fields.in_vertex_id, "_sink");
        assert!(fields.is_metadata("_etag"));
        assert!(!fields.is_metadata("name"));
    }

    #[test]
    fn load_overrides_only_named_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("fields.toml");
        std::fs::write(&path, "partition_key = \"region\"\n").expect("write config");

        let fields = FieldNames::load(&path).expect("load config");
        assert_eq!(fields.partition_key, "region");
        assert_eq!(fields.edge_marker, "_isEdge");
    }

    #[test]
    fn load_rejects_bad_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("fields.toml");
        std::fs::write(&path, "partition_key = [not toml").expect("write config");

        let err = FieldNames::load(&path).expect_err("parse failure");
        assert!(matches!(err, MigrationError::InvalidConfig(_)));
    }
}
