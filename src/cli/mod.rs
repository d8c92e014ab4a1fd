//! CLI adapter for ragchat
//!
//! Provides a command-line interface for ingestion, questions and
//! interactive chat. This module is parallel to `http/`: both depend
//! on `core/` but not on each other.
//!
//! # Architecture
//!
//! ```text
//!              +------------------+
//!              |     core/        |
//!              |  (domain logic)  |
//!              +--------+---------+
//!                       |
//!          +------------+------------+
//!          |                         |
//!          v                         v
//! +------------------+      +------------------+
//! |      http/       |      |      cli/        |
//! | (axum adapter)   |      | (clap adapter)   |
//! +------------------+      +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ragchat - chat with your PDF and Word documents
///
/// Ingest documents into a local vector store, then ask questions that
/// are answered by a local LLM using the most relevant passages.
#[derive(Parser, Debug)]
#[command(name = "ragchat")]
#[command(version)]
#[command(about = "Retrieval-augmented chat over local documents", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Log progress to stderr (repeat for debug output)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest documents into the vector store
    Ingest(commands::IngestArgs),

    /// Ask a single question
    Ask(commands::AskArgs),

    /// Start an interactive chat
    Chat(commands::ChatArgs),

    /// Show vector store statistics
    Stats(commands::StatsArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  ragchat completions bash > ~/.local/share/bash-completion/completions/ragchat
    ///   zsh:   ragchat completions zsh > ~/.zfunc/_ragchat
    ///   fish:  ragchat completions fish > ~/.config/fish/completions/ragchat.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    let Cli {
        format,
        verbose,
        command,
    } = cli;

    // Handle commands that don't need services
    let command = match command {
        Commands::Completions(args) => return commands::completions::execute(args),
        Commands::ShowConfig(args) => {
            let config = Config::load()?;
            return commands::config::execute(args, &config, format);
        }
        command => command,
    };

    init_logging(verbose);

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;

    // Create services
    let services = Arc::new(Services::new(config)?);

    match command {
        Commands::Ingest(args) => commands::ingest::execute(args, &services, format).await,
        Commands::Ask(args) => commands::ask::execute(args, &services, format).await,
        Commands::Chat(args) => commands::chat::execute(args, &services, format).await,
        Commands::Stats(args) => commands::stats::execute(args, &services, format).await,
        Commands::ShowConfig(_) | Commands::Completions(_) => Ok(()),
    }
}

/// Install the log subscriber on stderr
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "ragchat=warn",
        1 => "ragchat=info",
        _ => "ragchat=debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default.into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
