//! Two-phase bulk import orchestration
//!
//! Vertices stream first; every vertex batch must be acknowledged before
//! the edge phase starts, because edge transformation reads the partition
//! key index the vertex phase populates. That phase boundary is the only
//! ordering guarantee the pipeline needs, and it is a full barrier.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::FieldNames;
use crate::element::GraphElement;
use crate::error::{MigrationError, MigrationResult};
use crate::metrics::{MigrationReport, Phase, PhaseStats};
use crate::partition::PartitionKeyMap;
use crate::progress::PhaseProgress;
use crate::sink::{BulkSink, SinkInfo};
use crate::source::{DocumentFilter, DocumentSource};
use crate::transform::ElementTransformer;

/// Tunables for one migration run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Maximum elements buffered in memory before a bulk submission
    pub batch_size: usize,
    /// Insert-or-replace at the destination; keeps re-runs convergent
    pub upsert: bool,
    /// Progress report interval
    pub progress_interval: Duration,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            upsert: true,
            progress_interval: Duration::from_secs(10),
        }
    }
}

/// Drives a full fixed-to-partitioned migration against a source scan and
/// a destination bulk sink.
///
/// State machine: `Init → Vertices → Edges → Done`, with failure terminal
/// from any state. Nothing written is rolled back on failure; re-running
/// with upsert converges.
pub struct BulkImporter<S, K> {
    source: S,
    sink: K,
    fields: FieldNames,
    transformer: ElementTransformer,
    index: Arc<PartitionKeyMap>,
    options: ImportOptions,
    phase: Phase,
    vertices: PhaseStats,
    edges: PhaseStats,
    source_vertices: Option<u64>,
    source_edges: Option<u64>,
}

impl<S: DocumentSource, K: BulkSink> BulkImporter<S, K> {
    /// Wire up a run. The index starts empty and lives exactly as long as
    /// the importer.
    #[must_use]
    pub fn new(source: S, sink: K, fields: FieldNames, options: ImportOptions) -> Self {
        let index = Arc::new(PartitionKeyMap::new());
        let transformer = ElementTransformer::new(fields.clone(), Arc::clone(&index));
        Self {
            source,
            sink,
            fields,
            transformer,
            index,
            options,
            phase: Phase::Init,
            vertices: PhaseStats::default(),
            edges: PhaseStats::default(),
            source_vertices: None,
            source_edges: None,
        }
    }

    /// Run the migration to completion, folding any failure into the
    /// report so partial metrics survive.
    pub async fn run(mut self) -> MigrationReport {
        let failure = self.execute().await.err();
        if let Some(err) = &failure {
            warn!(phase = self.phase.name(), error = %err, "migration failed");
        }
        MigrationReport {
            phase: self.phase,
            vertices: self.vertices,
            edges: self.edges,
            source_vertices: self.source_vertices,
            source_edges: self.source_edges,
            failure,
        }
    }

    async fn execute(&mut self) -> MigrationResult<()> {
        let sink_info = self.sink.initialize().await?;
        self.check_partitioning(&sink_info)?;

        self.phase = Phase::Vertices;
        self.run_vertex_phase().await?;
        info!(
            vertices = self.vertices.imported,
            index_entries = self.index.len(),
            "vertex phase complete"
        );

        self.phase = Phase::Edges;
        self.run_edge_phase().await?;
        info!(edges = self.edges.imported, "edge phase complete");

        self.phase = Phase::Done;
        Ok(())
    }

    /// The destination must shard on the same field the migration lifts
    /// out of the source documents. Checked once at init, never retried.
    fn check_partitioning(&self, sink_info: &SinkInfo) -> MigrationResult<()> {
        let Some(path) = &sink_info.partition_key_path else {
            return Ok(());
        };
        if path.trim_start_matches('/') != self.fields.partition_key {
            return Err(MigrationError::ConfigurationMismatch {
                expected: self.fields.partition_key.clone(),
                actual: path.clone(),
            });
        }
        Ok(())
    }

    async fn run_vertex_phase(&mut self) -> MigrationResult<()> {
        let total = self.source.total_documents(DocumentFilter::Vertices).await?;
        self.source_vertices = total;
        let progress = PhaseProgress::new("vertices", total, self.options.progress_interval);

        self.source.begin(DocumentFilter::Vertices).await?;
        let mut pending = Vec::new();
        loop {
            let batch = self.source.next_batch().await?;
            if batch.is_empty() {
                break;
            }
            for doc in &batch {
                if let Some(vertex) = self.transformer.transform_vertex(doc)? {
                    pending.push(GraphElement::Vertex(vertex));
                }
                if pending.len() >= self.options.batch_size {
                    self.submit(std::mem::take(&mut pending)).await?;
                }
            }
            progress.add(batch.len() as u64);
        }
        self.submit(pending).await?;
        Ok(())
    }

    async fn run_edge_phase(&mut self) -> MigrationResult<()> {
        let total = self.source.total_documents(DocumentFilter::Edges).await?;
        self.source_edges = total;
        let progress = PhaseProgress::new("edges", total, self.options.progress_interval);

        self.source.begin(DocumentFilter::Edges).await?;
        let mut first_unresolved: Option<MigrationError> = None;
        let mut unresolved = 0u64;
        let mut pending = Vec::new();
        loop {
            let batch = self.source.next_batch().await?;
            if batch.is_empty() {
                break;
            }
            for doc in &batch {
                match self.transformer.transform_edge(doc) {
                    Ok(Some(edge)) => pending.push(GraphElement::Edge(edge)),
                    Ok(None) => {}
                    // A dangling endpoint fails the run but not the rest of
                    // the phase: remaining edges still migrate.
                    Err(err @ MigrationError::UnresolvedEndpoint(_)) => {
                        unresolved += 1;
                        warn!(error = %err, "edge endpoint unresolved");
                        first_unresolved.get_or_insert(err);
                    }
                    Err(err) => return Err(err),
                }
                if pending.len() >= self.options.batch_size {
                    self.submit(std::mem::take(&mut pending)).await?;
                }
            }
            progress.add(batch.len() as u64);
        }
        self.submit(pending).await?;

        if let Some(err) = first_unresolved {
            warn!(unresolved, "edge phase finished with unresolved endpoints");
            return Err(err);
        }
        Ok(())
    }

    async fn submit(&mut self, elements: Vec<GraphElement>) -> MigrationResult<()> {
        if elements.is_empty() {
            return Ok(());
        }
        let response = self.sink.bulk_write(elements, self.options.upsert).await?;
        let stats = match self.phase {
            Phase::Edges => &mut self.edges,
            _ => &mut self.vertices,
        };
        stats.absorb(&response);
        Ok(())
    }
}
