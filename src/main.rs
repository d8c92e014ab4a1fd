//! ragchat HTTP server entry point
//!
//! Starts the REST API server for the ragchat service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragchat::core::config::Config;
use ragchat::core::services::Services;
use ragchat::core::xdg::XdgDirs;
use ragchat::http;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (RAGCHAT_LOG_FORMAT=json for structured output)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ragchat=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("RAGCHAT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting ragchat server");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Initialize XDG directories
    let xdg = XdgDirs::new();
    xdg.log_paths();
    xdg.ensure_dirs_exist()?;

    // Load configuration
    let config = Config::load_with_xdg(&xdg)?;
    config.log_config();

    // Create shared services
    let services = Arc::new(Services::new(config.clone())?);

    if config.server.ingest_on_startup {
        match services.ingest_data_dir().await {
            Ok(stats) => tracing::info!(
                "Startup ingestion: {} added, {} already indexed",
                stats.chunks_added,
                stats.chunks_skipped
            ),
            Err(e) => tracing::warn!("Startup ingestion failed: {}", e),
        }
    }

    let app = http::router(Arc::clone(&services));

    // Bind to address and start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("Service ready - Health check at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
