//! Source store scan interface

use async_trait::async_trait;
use serde_json::Value;

use crate::config::FieldNames;
use crate::document::RawDocument;
use crate::error::MigrationResult;

/// Which of the two scan predicates to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFilter {
    /// Documents whose edge marker is absent or false
    Vertices,
    /// Documents whose edge marker is true
    Edges,
}

impl DocumentFilter {
    /// Apply the predicate to a scanned document.
    #[must_use]
    pub fn matches(self, doc: &RawDocument, fields: &FieldNames) -> bool {
        let is_edge = matches!(doc.get(&fields.edge_marker), Some(Value::Bool(true)));
        match self {
            Self::Vertices => !is_edge,
            Self::Edges => is_edge,
        }
    }
}

/// A finite, single-pass scan over the source store, restartable by
/// re-querying with [`begin`](DocumentSource::begin).
#[async_trait]
pub trait DocumentSource: Send {
    /// Start (or restart) a scan under the given predicate.
    async fn begin(&mut self, filter: DocumentFilter) -> MigrationResult<()>;

    /// Next batch of matching documents; empty when the scan is drained.
    async fn next_batch(&mut self) -> MigrationResult<Vec<RawDocument>>;

    /// Total matching documents, when the store can count them cheaply.
    /// Used for progress reporting and count validation only.
    async fn total_documents(&self, filter: DocumentFilter) -> MigrationResult<Option<u64>>;
}
