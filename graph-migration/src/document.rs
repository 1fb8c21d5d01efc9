//! Raw document access and classification
//!
//! Source documents are loosely-typed field maps. Only the small fixed set
//! of structural fields is pulled into a typed form; user properties stay
//! in the open map until transformation.

use serde_json::{Map, Value};

use crate::config::FieldNames;
use crate::error::{MigrationError, MigrationResult};

/// A source document as scanned from the store.
pub type RawDocument = Map<String, Value>;

/// Document id field, shared by both stores.
pub const ID_FIELD: &str = "id";
/// Element label field.
pub const LABEL_FIELD: &str = "label";
/// Time-to-live field, carried over when present.
pub const TTL_FIELD: &str = "ttl";

/// Whether a document represents a vertex or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Edge marker absent or false
    Vertex,
    /// Edge marker present and true
    Edge,
}

/// Structural fields extracted during classification.
#[derive(Debug, Clone)]
pub struct ClassifiedDocument {
    /// Vertex or edge
    pub kind: ElementKind,
    /// Document id
    pub id: String,
    /// Element label
    pub label: String,
    /// Endpoint fields, present exactly when `kind` is `Edge`
    pub endpoints: Option<EdgeEndpoints>,
}

/// The four endpoint fields an edge document must carry.
#[derive(Debug, Clone)]
pub struct EdgeEndpoints {
    /// Out-vertex (source endpoint) id
    pub out_id: String,
    /// In-vertex (sink endpoint) id
    pub in_id: String,
    /// Out-vertex label
    pub out_label: String,
    /// In-vertex label
    pub in_label: String,
}

/// Determine whether `doc` is a vertex or an edge and pull out the
/// structural fields the transformer needs.
///
/// The edge marker must be boolean when present; absence means vertex.
/// A missing or wrongly-typed structural field is `MalformedDocument`.
pub fn classify(doc: &RawDocument, fields: &FieldNames) -> MigrationResult<ClassifiedDocument> {
    let kind = match doc.get(&fields.edge_marker) {
        None => ElementKind::Vertex,
        Some(Value::Bool(true)) => ElementKind::Edge,
        Some(Value::Bool(false)) => ElementKind::Vertex,
        Some(other) => {
            return Err(MigrationError::MalformedDocument {
                context: format!(
                    "edge marker '{}' must be boolean, got {other}",
                    fields.edge_marker
                ),
            });
        }
    };

    let id = require_string(doc, ID_FIELD)?;
    let label = require_string(doc, LABEL_FIELD)?;

    let endpoints = match kind {
        ElementKind::Vertex => None,
        ElementKind::Edge => Some(EdgeEndpoints {
            out_id: require_string(doc, &fields.out_vertex_id)?,
            in_id: require_string(doc, &fields.in_vertex_id)?,
            out_label: require_string(doc, &fields.out_vertex_label)?,
            in_label: require_string(doc, &fields.in_vertex_label)?,
        }),
    };

    Ok(ClassifiedDocument {
        kind,
        id,
        label,
        endpoints,
    })
}

fn require_string(doc: &RawDocument, field: &str) -> MigrationResult<String> {
    match doc.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(MigrationError::MalformedDocument {
            context: format!("field '{field}' must be a string, got {other}"),
        }),
        None => Err(MigrationError::MalformedDocument {
            context: format!("missing required field '{field}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> RawDocument {
        value.as_object().expect("object fixture").clone()
    }

    #[test]
    fn absent_marker_classifies_as_vertex() {
        let d = doc(json!({"id": "v0", "label": "person"}));
        let classified = classify(&d, &FieldNames::default()).expect("classify");
        assert_eq!(classified.kind, ElementKind::Vertex);
        assert_eq!(classified.id, "v0");
        assert!(classified.endpoints.is_none());
    }

    #[test]
    fn false_marker_classifies_as_vertex() {
        let d = doc(json!({"id": "v0", "label": "person", "_isEdge": false}));
        let classified = classify(&d, &FieldNames::default()).expect("classify");
        assert_eq!(classified.kind, ElementKind::Vertex);
    }

    #[test]
    fn true_marker_extracts_endpoints() {
        let d = doc(json!({
            "id": "e0",
            "label": "knows",
            "_isEdge": true,
            "_vertexId": "v0",
            "_sink": "v1",
            "_vertexLabel": "person",
            "_sinkLabel": "person",
        }));
        let classified = classify(&d, &FieldNames::default()).expect("classify");
        assert_eq!(classified.kind, ElementKind::Edge);
        let endpoints = classified.endpoints.expect("edge endpoints");
        assert_eq!(endpoints.out_id, "v0");
        assert_eq!(endpoints.in_id, "v1");
    }

    #[test]
    fn non_boolean_marker_is_malformed() {
        let d = doc(json!({"id": "x", "label": "thing", "_isEdge": "yes"}));
        let err = classify(&d, &FieldNames::default()).expect_err("malformed");
        assert!(matches!(err, MigrationError::MalformedDocument { .. }));
    }

    #[test]
    fn missing_endpoint_field_is_malformed() {
        let d = doc(json!({
            "id": "e0",
            "label": "knows",
            "_isEdge": true,
            "_vertexId": "v0",
            "_vertexLabel": "person",
            "_sinkLabel": "person",
        }));
        let err = classify(&d, &FieldNames::default()).expect_err("malformed");
        assert!(matches!(err, MigrationError::MalformedDocument { .. }));
    }

    #[test]
    fn missing_id_is_malformed() {
        let d = doc(json!({"label": "person"}));
        let err = classify(&d, &FieldNames::default()).expect_err("malformed");
        assert!(matches!(err, MigrationError::MalformedDocument { .. }));
    }
}
