//! Fixed-to-partitioned graph migration pipeline
//!
//! Streams a graph collection out of a non-partitioned document store and
//! bulk-writes it into a partitioned graph store in two ordered phases:
//! vertices first, building the id → partition key index, then edges,
//! embedding both endpoints' partition keys resolved from that index. The
//! vertex phase fully drains (every batch acknowledged) before any edge is
//! transformed.

pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod pipeline;
pub mod progress;
pub mod sink;
pub mod source;
pub mod transform;

pub use config::FieldNames;
pub use document::{classify, ClassifiedDocument, EdgeEndpoints, ElementKind, RawDocument};
pub use element::{GraphEdge, GraphElement, GraphVertex};
pub use error::{MigrationError, MigrationResult};
pub use metrics::{CountCheck, MigrationReport, Phase, PhaseStats};
pub use partition::PartitionKeyMap;
pub use pipeline::{BulkImporter, ImportOptions};
pub use progress::PhaseProgress;
pub use sink::{BulkSink, BulkWriteResponse, DryRunSink, SinkInfo};
pub use source::{DocumentFilter, DocumentSource};
pub use transform::ElementTransformer;
