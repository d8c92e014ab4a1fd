//! HTTP REST adapter
//!
//! Depends only on core/. Exposes the chat routes and the `/api/v1`
//! ingestion and statistics routes via the Axum web framework.

pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::services::Services;

/// Build the application router over shared services
pub fn router(services: Arc<Services>) -> Router {
    let upload_limit = services.config.server.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health_handler))
        .route("/start", get(start_handler).post(start_handler))
        .route("/query", post(query_handler))
        .route(
            "/send",
            post(send_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/conversations/{id}", delete(end_conversation_handler))
        .route("/api/v1/ingest", post(ingest_handler))
        .route("/api/v1/stats", get(stats_handler))
        .layer(axum_middleware::from_fn(middleware::log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(services)
}
