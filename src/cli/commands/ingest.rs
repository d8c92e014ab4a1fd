//! Ingest command - load documents into the vector store

use crate::cli::output::{colors, format_duration_ms, print_output, print_success};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::{IngestResponse, IngestStats};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory to ingest (defaults to the configured data directory)
    #[arg(conflicts_with = "file")]
    pub path: Option<PathBuf>,

    /// Ingest a single PDF or .docx file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

/// Execute the ingest command
pub async fn execute(
    args: IngestArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = args
        .file
        .or(args.path)
        .unwrap_or_else(|| services.config.storage.data_dir.clone());

    if !path.exists() {
        return Err(format!(
            "Path '{}' does not exist. Pass a directory of PDF/Word files or --file.",
            path.display()
        )
        .into());
    }

    let stats = services.ingest(&path).await?;

    let response = IngestResponse {
        path: path.display().to_string(),
        stats,
    };

    print_output(&response, format, |r| print_human(&r.path, &r.stats))?;
    Ok(())
}

fn print_human(path: &str, stats: &IngestStats) {
    if stats.chunks_added == 0 && stats.chunks_created > 0 {
        print_success(&format!("Already up to date: {path}"));
    } else {
        print_success(&format!("Ingested {path}"));
    }

    println!(
        "  {} {}",
        colors::label("Files:"),
        colors::number(&stats.files_loaded.to_string())
    );
    println!(
        "  {} {}",
        colors::label("Documents:"),
        colors::number(&stats.documents_loaded.to_string())
    );
    println!(
        "  {} {} ({} new, {} already indexed)",
        colors::label("Chunks:"),
        colors::number(&stats.chunks_created.to_string()),
        colors::number(&stats.chunks_added.to_string()),
        colors::dim(&stats.chunks_skipped.to_string())
    );
    println!(
        "  {} {}",
        colors::label("Duration:"),
        colors::number(&format_duration_ms(stats.duration_ms))
    );
}
