//! Fixed-to-partitioned graph migration CLI

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use graph_migration::{BulkImporter, DryRunSink, FieldNames, ImportOptions, MigrationReport};

mod export_source;
mod http_sink;

use export_source::ExportFileSource;
use http_sink::HttpBulkSink;

#[derive(Parser, Debug)]
#[command(name = "migrate-fixed-graph")]
#[command(about = "Migrate a fixed graph collection into a partitioned one", long_about = None)]
struct Args {
    /// Source export file (newline-delimited JSON documents)
    #[arg(long)]
    source: PathBuf,

    /// Destination bulk-write endpoint URL
    #[arg(long)]
    target: Option<String>,

    /// Destination partition key field (overrides the field mapping file)
    #[arg(long)]
    partition_key: Option<String>,

    /// Field mapping file (TOML); defaults cover the stock source schema
    #[arg(long)]
    fields: Option<PathBuf>,

    /// Maximum elements buffered before a bulk submission
    #[arg(long, default_value = "1000")]
    batch_size: usize,

    /// Bounded retry attempts for throttled bulk writes
    #[arg(long, default_value = "10")]
    max_retries: u32,

    /// Transform and count without writing to the destination
    #[arg(long)]
    dry_run: bool,

    /// Compare imported counts against source counts after the run
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut fields = match &args.fields {
        Some(path) => FieldNames::load(path)?,
        None => FieldNames::default(),
    };
    if let Some(pk) = &args.partition_key {
        fields.partition_key = pk.clone();
    }

    tracing::info!("Starting fixed-to-partitioned graph migration");
    tracing::info!("Source: {}", args.source.display());
    tracing::info!("Partition key: {}", fields.partition_key);
    tracing::info!("Batch size: {}", args.batch_size);

    let source = ExportFileSource::open(&args.source, fields.clone(), args.batch_size)?;
    let options = ImportOptions {
        batch_size: args.batch_size,
        upsert: true,
        progress_interval: Duration::from_secs(10),
    };

    let report: MigrationReport = if args.dry_run {
        tracing::info!("Dry run: no writes will be issued");
        BulkImporter::new(source, DryRunSink::new(), fields, options)
            .run()
            .await
    } else {
        let target = args
            .target
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--target is required unless --dry-run is set"))?;
        tracing::info!("Target: {target}");
        let sink = HttpBulkSink::new(target, fields.clone(), args.max_retries);
        BulkImporter::new(source, sink, fields, options).run().await
    };

    report.print_summary();

    if args.validate {
        report.count_check().print();
    }

    if let Some(err) = &report.failure {
        tracing::error!(phase = report.phase.name(), "migration failed: {err}");
        std::process::exit(1);
    }

    tracing::info!("Migration completed successfully");
    Ok(())
}
