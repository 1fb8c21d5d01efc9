//! Destination bulk-write interface

use std::time::Duration;

use async_trait::async_trait;

use crate::element::GraphElement;
use crate::error::MigrationResult;

/// Destination collection facts needed for the init-time compatibility
/// check.
#[derive(Debug, Clone)]
pub struct SinkInfo {
    /// Partition key path the destination is configured with, when the
    /// sink can report it. `None` skips the check.
    pub partition_key_path: Option<String>,
}

/// Aggregate statistics for one acknowledged bulk write.
#[derive(Debug, Clone, Default)]
pub struct BulkWriteResponse {
    /// Elements written (or upserted)
    pub written: u64,
    /// Wall time spent inside the sink
    pub elapsed: Duration,
    /// Destination-defined cost units consumed (request units, write
    /// units); zero when the destination reports none
    pub cost_units: f64,
}

/// Bulk-write transport for the destination store.
///
/// Implementations own their retry policy: throttled requests are retried
/// up to a bounded attempt count before surfacing a terminal failure.
#[async_trait]
pub trait BulkSink: Send {
    /// One-time setup; must be called once before any submission.
    async fn initialize(&mut self) -> MigrationResult<SinkInfo>;

    /// Write a batch with the given upsert semantics and return its stats.
    async fn bulk_write(
        &mut self,
        elements: Vec<GraphElement>,
        upsert: bool,
    ) -> MigrationResult<BulkWriteResponse>;
}

/// Sink that acknowledges batches without writing anywhere. Backs
/// `--dry-run` and exercises the pipeline in tests.
#[derive(Debug, Default)]
pub struct DryRunSink {
    written: u64,
}

impl DryRunSink {
    /// Create a dry-run sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total elements acknowledged so far.
    #[must_use]
    pub fn written(&self) -> u64 {
        self.written
    }
}

#[async_trait]
impl BulkSink for DryRunSink {
    async fn initialize(&mut self) -> MigrationResult<SinkInfo> {
        Ok(SinkInfo {
            partition_key_path: None,
        })
    }

    async fn bulk_write(
        &mut self,
        elements: Vec<GraphElement>,
        _upsert: bool,
    ) -> MigrationResult<BulkWriteResponse> {
        let written = elements.len() as u64;
        self.written += written;
        Ok(BulkWriteResponse {
            written,
            elapsed: Duration::ZERO,
            cost_units: 0.0,
        })
    }
}
