//! The id → partition key index shared across the two migration phases

use dashmap::DashMap;
use serde_json::Value;

use crate::error::{MigrationError, MigrationResult};

/// Process-lifetime mapping from vertex id to its partition key.
///
/// Populated during the vertex phase, read-only during the edge phase. The
/// map holds one entry per migrated vertex for the whole run; that memory
/// cost is what lets edge transformation avoid re-scanning the source for
/// every endpoint.
#[derive(Debug, Default)]
pub struct PartitionKeyMap {
    entries: DashMap<String, Value>,
}

impl PartitionKeyMap {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Record a vertex's partition key. First insert wins; re-recording the
    /// same id is a no-op, so re-running the vertex phase under upsert is
    /// safe and concurrent inserts are linearizable.
    pub fn record(&self, id: &str, value: Value) {
        self.entries.entry(id.to_string()).or_insert(value);
    }

    /// Look up the partition key recorded for `id`.
    ///
    /// A miss means an edge references a vertex that was never migrated,
    /// which is fatal for that edge.
    pub fn resolve(&self, id: &str) -> MigrationResult<Value> {
        self.entries
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| MigrationError::UnresolvedEndpoint(id.to_string()))
    }

    /// Number of vertices recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no vertex has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_returns_recorded_value() {
        let index = PartitionKeyMap::new();
        index.record("v0", json!(7));
        assert_eq!(index.resolve("v0").expect("recorded"), json!(7));
    }

    #[test]
    fn record_is_idempotent_first_insert_wins() {
        let index = PartitionKeyMap::new();
        index.record("v0", json!(7));
        index.record("v0", json!(99));
        assert_eq!(index.resolve("v0").expect("recorded"), json!(7));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn resolve_missing_id_is_unresolved_endpoint() {
        let index = PartitionKeyMap::new();
        let err = index.resolve("v5").expect_err("absent id");
        match err {
            MigrationError::UnresolvedEndpoint(id) => assert_eq!(id, "v5"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
