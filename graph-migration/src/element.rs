//! Partition-aware graph elements bound for the destination store

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::FieldNames;
use crate::document::{RawDocument, ID_FIELD, LABEL_FIELD, TTL_FIELD};

/// Field carrying the in-vertex partition key on destination edge documents.
pub const SINK_PARTITION_FIELD: &str = "_sinkPartition";

/// A vertex with its partition key lifted to a root-level scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphVertex {
    /// Unique id within the destination collection
    pub id: String,
    /// Vertex label
    pub label: String,
    /// Exactly one scalar value; the destination shards on it
    pub partition_key: Value,
    /// Time-to-live in seconds, when the source document carried one
    pub ttl: Option<i64>,
    /// User properties in source document order, unwrapped to scalars
    pub properties: Vec<(String, Value)>,
}

/// An edge carrying both endpoints' resolved partition keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    /// Unique id within the destination collection
    pub id: String,
    /// Edge label
    pub label: String,
    /// Out-vertex (source endpoint) id
    pub out_vertex_id: String,
    /// In-vertex (sink endpoint) id
    pub in_vertex_id: String,
    /// Out-vertex label
    pub out_vertex_label: String,
    /// In-vertex label
    pub in_vertex_label: String,
    /// Partition key resolved for the out-vertex
    pub out_vertex_partition_key: Value,
    /// Partition key resolved for the in-vertex
    pub in_vertex_partition_key: Value,
}

/// A transformed element ready for bulk submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GraphElement {
    /// A partition-aware vertex
    Vertex(GraphVertex),
    /// A partition-aware edge
    Edge(GraphEdge),
}

impl GraphElement {
    /// Element id, for logging and dedup.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Vertex(v) => &v.id,
            Self::Edge(e) => &e.id,
        }
    }

    /// Render the destination document for wire-level sinks.
    #[must_use]
    pub fn to_document(&self, fields: &FieldNames) -> RawDocument {
        match self {
            Self::Vertex(v) => v.to_document(fields),
            Self::Edge(e) => e.to_document(fields),
        }
    }
}

impl GraphVertex {
    /// Destination document: id, label, the partition key under its
    /// configured field, ttl when set, then user properties in order.
    #[must_use]
    pub fn to_document(&self, fields: &FieldNames) -> RawDocument {
        let mut doc = Map::new();
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        doc.insert(LABEL_FIELD.to_string(), Value::String(self.label.clone()));
        doc.insert(fields.partition_key.clone(), self.partition_key.clone());
        if let Some(ttl) = self.ttl {
            doc.insert(TTL_FIELD.to_string(), Value::from(ttl));
        }
        for (name, value) in &self.properties {
            doc.insert(name.clone(), value.clone());
        }
        doc
    }
}

impl GraphEdge {
    /// Destination document. The edge lives in the out-vertex's partition,
    /// so the configured partition key field carries the out-vertex key and
    /// the in-vertex key rides along under `_sinkPartition`.
    #[must_use]
    pub fn to_document(&self, fields: &FieldNames) -> RawDocument {
        let mut doc = Map::new();
        doc.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        doc.insert(LABEL_FIELD.to_string(), Value::String(self.label.clone()));
        doc.insert(fields.edge_marker.clone(), Value::Bool(true));
        doc.insert(
            fields.out_vertex_id.clone(),
            Value::String(self.out_vertex_id.clone()),
        );
        doc.insert(
            fields.in_vertex_id.clone(),
            Value::String(self.in_vertex_id.clone()),
        );
        doc.insert(
            fields.out_vertex_label.clone(),
            Value::String(self.out_vertex_label.clone()),
        );
        doc.insert(
            fields.in_vertex_label.clone(),
            Value::String(self.in_vertex_label.clone()),
        );
        doc.insert(
            fields.partition_key.clone(),
            self.out_vertex_partition_key.clone(),
        );
        doc.insert(
            SINK_PARTITION_FIELD.to_string(),
            self.in_vertex_partition_key.clone(),
        );
        doc
    }
}
