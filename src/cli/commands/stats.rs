//! Stats command - show vector store statistics

use crate::cli::output::{colors, format_bytes, format_relative_time, print_header, print_output};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::StatsResponse;
use clap::Args;
use std::sync::Arc;

/// Arguments for the stats command
#[derive(Args, Debug)]
pub struct StatsArgs {}

/// Execute the stats command
pub async fn execute(
    _args: StatsArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let stats = services.stats().await;
    print_output(&stats, format, print_human)?;
    Ok(())
}

fn print_human(stats: &StatsResponse) {
    print_header("Vector store");
    println!(
        "  {} {}",
        colors::label("Location:"),
        colors::file_path(&stats.store_dir)
    );
    println!(
        "  {} {}",
        colors::label("Records:"),
        colors::number(&stats.records.to_string())
    );
    println!(
        "  {} {}",
        colors::label("Size:"),
        colors::number(&format_bytes(stats.store_size_bytes))
    );
    println!(
        "  {} {} ({}, {} dims)",
        colors::label("Embedding:"),
        stats.embedding_model,
        stats.embedding_backend,
        stats.dimensions
    );
    match &stats.last_ingested_at {
        Some(ts) => println!(
            "  {} {}",
            colors::label("Last ingested:"),
            colors::dim(&format_relative_time(ts))
        ),
        None => println!("  {} {}", colors::label("Last ingested:"), colors::dim("never")),
    }
}
