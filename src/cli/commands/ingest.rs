//! Ingest command implementation.

use anyhow::{Context, Result};
use quantlab_config::AppConfig;
use quantlab_data::{find_archives, HistoricalDataProcessor, IngestSummary};
use std::path::Path;
use tracing::info;

use crate::cli::{IngestArgs, OutputFormat};

pub async fn run(args: IngestArgs, config: &AppConfig) -> Result<()> {
    let paths = if !args.paths.is_empty() {
        args.paths
    } else {
        let dir = args
            .dir
            .unwrap_or_else(|| Path::new(&config.data.download_dir).to_path_buf());
        find_archives(&dir)
            .with_context(|| format!("Failed to scan {}", dir.display()))?
    };

    info!(files = paths.len(), db = %config.data.db_path, "Ingesting archives");

    let processor = HistoricalDataProcessor::new(&config.data.db_path);
    let summary = tokio::task::spawn_blocking(move || processor.process_and_store(&paths))
        .await?
        .context("Failed to store archives")?;

    print_summary(&summary, args.output)
}

pub(crate) fn print_summary(summary: &IngestSummary, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
        OutputFormat::Text => {
            println!("Ingestion Summary");
            println!("═══════════════════════════════════════════════════════════");
            println!("  Files processed:     {}", summary.files_processed);
            println!("  Files skipped:       {}", summary.files_skipped);
            println!(
                "  Klines:              {} parsed, {} new",
                summary.klines_parsed, summary.klines_inserted
            );
            println!(
                "  Trades:              {} parsed, {} new",
                summary.trades_parsed, summary.trades_inserted
            );
        }
    }
    Ok(())
}
