//! Ask command - answer one question from the indexed documents

use crate::cli::output::{colors, print_output};
use crate::cli::OutputFormat;
use crate::core::services::Services;
use crate::core::types::QueryResponse;
use clap::Args;
use std::sync::Arc;

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question to ask
    pub question: String,

    /// Chat model to use instead of the configured one
    #[arg(long, short = 'm')]
    pub model: Option<String>,

    /// List the ids of the chunks used as context
    #[arg(long, short = 's')]
    pub sources: bool,
}

/// Execute the ask command
pub async fn execute(
    args: AskArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = services
        .chat
        .query(&args.question, None, args.model.as_deref())
        .await?;

    print_output(&response, format, |r| print_human(r, args.sources))?;
    Ok(())
}

fn print_human(response: &QueryResponse, show_sources: bool) {
    println!("{}", response.response.trim());

    if show_sources && !response.sources.is_empty() {
        println!();
        println!("{}", colors::label("Sources:"));
        for id in &response.sources {
            println!("  {}", colors::chunk_id(id));
        }
    }
}
