//! Newline-delimited JSON export file source

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use graph_migration::{
    DocumentFilter, DocumentSource, FieldNames, MigrationError, MigrationResult, RawDocument,
};

/// Streams documents from an NDJSON export of the source collection,
/// applying the vertex/edge marker predicate per scan. Each `begin`
/// re-opens the file, which is the export-file equivalent of re-querying
/// the store.
pub struct ExportFileSource {
    path: PathBuf,
    fields: FieldNames,
    batch_size: usize,
    filter: DocumentFilter,
    lines: Option<Lines<BufReader<File>>>,
}

impl std::fmt::Debug for ExportFileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportFileSource")
            .field("path", &self.path)
            .field("fields", &self.fields)
            .field("batch_size", &self.batch_size)
            .field("filter", &self.filter)
            .field("lines", &self.lines.is_some())
            .finish()
    }
}

impl ExportFileSource {
    /// Open a source over an export file.
    pub fn open(path: &Path, fields: FieldNames, batch_size: usize) -> MigrationResult<Self> {
        if !path.is_file() {
            return Err(MigrationError::SourceRead(format!(
                "export file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            fields,
            batch_size,
            filter: DocumentFilter::Vertices,
            lines: None,
        })
    }

    fn reader(&self) -> MigrationResult<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    fn parse_line(line: &str) -> MigrationResult<Option<RawDocument>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let value: serde_json::Value = serde_json::from_str(trimmed)?;
        match value {
            serde_json::Value::Object(doc) => Ok(Some(doc)),
            other => Err(MigrationError::SourceRead(format!(
                "export line is not a JSON object: {other}"
            ))),
        }
    }
}

#[async_trait]
impl DocumentSource for ExportFileSource {
    async fn begin(&mut self, filter: DocumentFilter) -> MigrationResult<()> {
        self.filter = filter;
        self.lines = Some(self.reader()?.lines());
        Ok(())
    }

    async fn next_batch(&mut self) -> MigrationResult<Vec<RawDocument>> {
        let Some(lines) = self.lines.as_mut() else {
            return Err(MigrationError::SourceRead(
                "scan not started; call begin first".to_string(),
            ));
        };

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            let Some(line) = lines.next() else {
                break;
            };
            if let Some(doc) = Self::parse_line(&line?)? {
                if self.filter.matches(&doc, &self.fields) {
                    batch.push(doc);
                }
            }
        }
        Ok(batch)
    }

    async fn total_documents(&self, filter: DocumentFilter) -> MigrationResult<Option<u64>> {
        let mut count = 0u64;
        for line in self.reader()?.lines() {
            if let Some(doc) = Self::parse_line(&line?)? {
                if filter.matches(&doc, &self.fields) {
                    count += 1;
                }
            }
        }
        Ok(Some(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_export(lines: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("export.jsonl");
        let mut file = File::create(&path).expect("create export");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        (dir, path)
    }

    #[tokio::test]
    async fn scans_split_vertices_and_edges() {
        let (_dir, path) = write_export(&[
            r#"{"id": "v0", "label": "person"}"#,
            r#"{"id": "e0", "label": "knows", "_isEdge": true}"#,
            "",
            r#"{"id": "v1", "label": "person", "_isEdge": false}"#,
        ]);
        let mut source =
            ExportFileSource::open(&path, FieldNames::default(), 10).expect("open source");

        source.begin(DocumentFilter::Vertices).await.expect("begin");
        let vertices = source.next_batch().await.expect("batch");
        assert_eq!(vertices.len(), 2);
        assert!(source.next_batch().await.expect("drained").is_empty());

        source.begin(DocumentFilter::Edges).await.expect("rescan");
        let edges = source.next_batch().await.expect("batch");
        assert_eq!(edges.len(), 1);

        let totals = source
            .total_documents(DocumentFilter::Vertices)
            .await
            .expect("count");
        assert_eq!(totals, Some(2));
    }

    #[tokio::test]
    async fn batches_respect_the_configured_size() {
        let (_dir, path) = write_export(&[
            r#"{"id": "v0", "label": "person"}"#,
            r#"{"id": "v1", "label": "person"}"#,
            r#"{"id": "v2", "label": "person"}"#,
        ]);
        let mut source =
            ExportFileSource::open(&path, FieldNames::default(), 2).expect("open source");

        source.begin(DocumentFilter::Vertices).await.expect("begin");
        assert_eq!(source.next_batch().await.expect("batch").len(), 2);
        assert_eq!(source.next_batch().await.expect("batch").len(), 1);
        assert!(source.next_batch().await.expect("drained").is_empty());
    }

    #[tokio::test]
    async fn non_object_line_is_a_source_error() {
        let (_dir, path) = write_export(&[r#"["not", "a", "document"]"#]);
        let mut source =
            ExportFileSource::open(&path, FieldNames::default(), 10).expect("open source");

        source.begin(DocumentFilter::Vertices).await.expect("begin");
        let err = source.next_batch().await.expect_err("bad line");
        assert!(matches!(err, MigrationError::SourceRead(_)));
    }

    #[test]
    fn missing_file_is_rejected_at_open() {
        let err = ExportFileSource::open(
            Path::new("/nonexistent/export.jsonl"),
            FieldNames::default(),
            10,
        )
        .expect_err("missing file");
        assert!(matches!(err, MigrationError::SourceRead(_)));
    }
}
