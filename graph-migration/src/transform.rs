//! Raw document to graph element transformation

use std::sync::Arc;

use serde_json::Value;

use crate::config::FieldNames;
use crate::document::{self, ElementKind, RawDocument, ID_FIELD, LABEL_FIELD, TTL_FIELD};
use crate::element::{GraphEdge, GraphVertex};
use crate::error::{MigrationError, MigrationResult};
use crate::partition::PartitionKeyMap;

/// Converts classified source documents into partition-aware elements.
///
/// Vertex transformation records each partition key in the shared index;
/// edge transformation resolves both endpoint keys from it. Aside from that
/// index traffic both entry points are pure.
pub struct ElementTransformer {
    fields: FieldNames,
    index: Arc<PartitionKeyMap>,
}

impl ElementTransformer {
    /// Create a transformer over the given field mapping and shared index.
    #[must_use]
    pub fn new(fields: FieldNames, index: Arc<PartitionKeyMap>) -> Self {
        Self { fields, index }
    }

    /// Transform a vertex document, recording its partition key in the
    /// index.
    ///
    /// Returns `Ok(None)` when the document turns out to be an edge, so a
    /// misrouted document is skipped instead of written in the wrong phase.
    pub fn transform_vertex(&self, doc: &RawDocument) -> MigrationResult<Option<GraphVertex>> {
        let classified = document::classify(doc, &self.fields)?;
        if classified.kind == ElementKind::Edge {
            return Ok(None);
        }

        let partition_key = self.partition_key_value(doc, &classified.id)?;
        self.index.record(&classified.id, partition_key.clone());

        let ttl = match doc.get(TTL_FIELD) {
            Some(value) => Some(value.as_i64().ok_or_else(|| {
                MigrationError::MalformedDocument {
                    context: format!("ttl on vertex '{}' must be an integer", classified.id),
                }
            })?),
            None => None,
        };

        let mut properties = Vec::new();
        for (name, value) in doc {
            if self.is_reserved(name) {
                continue;
            }
            if let Some(scalar) = property_array_value(value) {
                properties.push((name.clone(), scalar));
            }
        }

        Ok(Some(GraphVertex {
            id: classified.id,
            label: classified.label,
            partition_key,
            ttl,
            properties,
        }))
    }

    /// Transform an edge document, resolving both endpoint partition keys
    /// from the index.
    ///
    /// Returns `Ok(None)` when the document turns out to be a vertex. An
    /// endpoint missing from the index is `UnresolvedEndpoint`; no partial
    /// edge is ever produced.
    pub fn transform_edge(&self, doc: &RawDocument) -> MigrationResult<Option<GraphEdge>> {
        let classified = document::classify(doc, &self.fields)?;
        if classified.kind == ElementKind::Vertex {
            return Ok(None);
        }
        let Some(endpoints) = classified.endpoints else {
            return Ok(None);
        };

        let out_key = self.index.resolve(&endpoints.out_id)?;
        let in_key = self.index.resolve(&endpoints.in_id)?;

        Ok(Some(GraphEdge {
            id: classified.id,
            label: classified.label,
            out_vertex_id: endpoints.out_id,
            in_vertex_id: endpoints.in_id,
            out_vertex_label: endpoints.out_label,
            in_vertex_label: endpoints.in_label,
            out_vertex_partition_key: out_key,
            in_vertex_partition_key: in_key,
        }))
    }

    /// Decode the partition key source field: a property array holding
    /// exactly one value. The target model has no composite partition keys,
    /// so anything else is fatal.
    fn partition_key_value(&self, doc: &RawDocument, id: &str) -> MigrationResult<Value> {
        let field = &self.fields.partition_key;
        let raw = doc
            .get(field)
            .ok_or_else(|| MigrationError::InvalidPartitionKey {
                id: id.to_string(),
                reason: format!("missing partition key field '{field}'"),
            })?;
        let items = raw
            .as_array()
            .ok_or_else(|| MigrationError::InvalidPartitionKey {
                id: id.to_string(),
                reason: format!("partition key field '{field}' is not a property array"),
            })?;
        if items.len() != 1 {
            return Err(MigrationError::InvalidPartitionKey {
                id: id.to_string(),
                reason: format!(
                    "partition key must hold exactly one value, found {}",
                    items.len()
                ),
            });
        }
        items[0]
            .as_object()
            .and_then(|obj| obj.get("_value"))
            .cloned()
            .ok_or_else(|| MigrationError::InvalidPartitionKey {
                id: id.to_string(),
                reason: "partition key entry carries no _value".to_string(),
            })
    }

    fn is_reserved(&self, name: &str) -> bool {
        name == ID_FIELD
            || name == LABEL_FIELD
            || name == TTL_FIELD
            || name == self.fields.partition_key
            || self.fields.is_metadata(name)
    }
}

/// Unwrap a property-array representation (a single-element array holding
/// an object with a `_value`) to its scalar. Fields of any other shape are
/// not user properties.
fn property_array_value(value: &Value) -> Option<Value> {
    let items = value.as_array()?;
    if items.len() != 1 {
        return None;
    }
    items[0].as_object()?.get("_value").cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> RawDocument {
        value.as_object().expect("object fixture").clone()
    }

    fn transformer() -> ElementTransformer {
        ElementTransformer::new(FieldNames::default(), Arc::new(PartitionKeyMap::new()))
    }

    fn vertex_doc(id: &str, pk: i64) -> RawDocument {
        doc(json!({
            "id": id,
            "label": "person",
            "partitionKey": [{"id": "pk-prop", "_value": pk}],
            "name": [{"id": "name-prop", "_value": format!("name-{id}")}],
            "_rid": "opaque",
            "_etag": "\"00\"",
        }))
    }

    fn edge_doc(id: &str, out_id: &str, in_id: &str) -> RawDocument {
        doc(json!({
            "id": id,
            "label": "knows",
            "_isEdge": true,
            "_vertexId": out_id,
            "_sink": in_id,
            "_vertexLabel": "person",
            "_sinkLabel": "person",
        }))
    }

    #[test]
    fn vertex_partition_key_round_trips_through_index() {
        let t = transformer();
        let vertex = t
            .transform_vertex(&vertex_doc("v0", 7))
            .expect("transform")
            .expect("vertex");
        assert_eq!(vertex.partition_key, json!(7));
        assert_eq!(t.index.resolve("v0").expect("recorded"), json!(7));
    }

    #[test]
    fn property_copy_filters_reserved_and_unwraps_values() {
        let t = transformer();
        let mut raw = vertex_doc("v0", 7);
        raw.insert("ttl".to_string(), json!(60));
        raw.insert("plain_scalar".to_string(), json!("not a property array"));
        raw.insert("pair".to_string(), json!([{"_value": 1}, {"_value": 2}]));

        let vertex = t.transform_vertex(&raw).expect("transform").expect("vertex");
        assert_eq!(vertex.ttl, Some(60));
        assert_eq!(
            vertex.properties,
            vec![("name".to_string(), json!("name-v0"))]
        );
    }

    #[test]
    fn multi_valued_partition_key_is_fatal_and_records_nothing() {
        let t = transformer();
        let raw = doc(json!({
            "id": "v0",
            "label": "person",
            "partitionKey": [{"_value": 0}, {"_value": 1}],
        }));
        let err = t.transform_vertex(&raw).expect_err("multi-valued key");
        assert!(matches!(err, MigrationError::InvalidPartitionKey { .. }));
        assert!(t.index.is_empty());
    }

    #[test]
    fn missing_partition_key_is_fatal() {
        let t = transformer();
        let raw = doc(json!({"id": "v0", "label": "person"}));
        let err = t.transform_vertex(&raw).expect_err("missing key");
        assert!(matches!(err, MigrationError::InvalidPartitionKey { .. }));
    }

    #[test]
    fn edge_document_is_skipped_by_vertex_transform() {
        let t = transformer();
        let skipped = t
            .transform_vertex(&edge_doc("e0", "v0", "v1"))
            .expect("transform");
        assert!(skipped.is_none());
    }

    #[test]
    fn vertex_document_is_skipped_by_edge_transform() {
        let t = transformer();
        let skipped = t.transform_edge(&vertex_doc("v0", 0)).expect("transform");
        assert!(skipped.is_none());
    }

    #[test]
    fn edge_transform_attaches_both_resolved_keys() {
        let t = transformer();
        t.transform_vertex(&vertex_doc("v0", 0)).expect("v0");
        t.transform_vertex(&vertex_doc("v1", 1)).expect("v1");

        let edge = t
            .transform_edge(&edge_doc("e0", "v0", "v1"))
            .expect("transform")
            .expect("edge");
        assert_eq!(edge.out_vertex_partition_key, json!(0));
        assert_eq!(edge.in_vertex_partition_key, json!(1));
    }

    #[test]
    fn unmigrated_endpoint_fails_edge_transform() {
        let t = transformer();
        t.transform_vertex(&vertex_doc("v1", 1)).expect("v1");

        let err = t
            .transform_edge(&edge_doc("e0", "v5", "v1"))
            .expect_err("dangling endpoint");
        match err {
            MigrationError::UnresolvedEndpoint(id) => assert_eq!(id, "v5"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_integer_ttl_is_malformed() {
        let t = transformer();
        let mut raw = vertex_doc("v0", 0);
        raw.insert("ttl".to_string(), json!("soon"));
        let err = t.transform_vertex(&raw).expect_err("bad ttl");
        assert!(matches!(err, MigrationError::MalformedDocument { .. }));
    }
}
