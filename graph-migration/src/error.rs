//! Error types for migration operations

use thiserror::Error;

/// Errors that can occur while migrating a graph collection
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A source document could not be classified or lacks a mandatory
    /// structural field
    #[error("Malformed source document: {context}")]
    MalformedDocument {
        /// Which field or shape constraint was violated
        context: String,
    },

    /// A vertex carries a missing or multi-valued partition key
    #[error("Invalid partition key on vertex '{id}': {reason}")]
    InvalidPartitionKey {
        /// Vertex document id
        id: String,
        /// Why the partition key could not be decoded
        reason: String,
    },

    /// An edge references a vertex id never recorded during the vertex phase
    #[error("Edge endpoint '{0}' was never migrated as a vertex")]
    UnresolvedEndpoint(String),

    /// Destination partitioning configuration is incompatible with the
    /// planned writes
    #[error("Destination partition key mismatch: expected '{expected}', found '{actual}'")]
    ConfigurationMismatch {
        /// Partition key field the migration was configured with
        expected: String,
        /// Partition key path the destination reported
        actual: String,
    },

    /// Field mapping configuration could not be parsed
    #[error("Invalid field mapping: {0}")]
    InvalidConfig(String),

    /// Error reading from the source store
    #[error("Failed to read from source: {0}")]
    SourceRead(String),

    /// Bulk write failed, either immediately or after the sink exhausted
    /// its retries
    #[error("Bulk write failed: {0}")]
    SinkFailure(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;
