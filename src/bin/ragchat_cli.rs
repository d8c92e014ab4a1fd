//! ragchat CLI - chat with your documents from the terminal
//!
//! Runs ingestion and question answering in-process, without the
//! HTTP server.
//!
//! # Examples
//!
//! ```bash
//! # Ingest the configured data directory
//! ragchat ingest
//!
//! # Ingest a single file
//! ragchat ingest --file ./manual.pdf
//!
//! # Ask one question
//! ragchat ask "How do I reset the device?" --sources
//!
//! # Interactive chat
//! ragchat chat
//!
//! # Store statistics as JSON
//! ragchat --format json stats
//! ```

use clap::Parser;
use ragchat::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
