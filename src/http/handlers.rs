//! HTTP request handlers for the ragchat API
//!
//! Chat routes (`/start`, `/query`, `/send`, conversation teardown)
//! plus the `/api/v1` ingestion and statistics routes.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    response::IntoResponse,
    Json,
};

use crate::core::error::{RagError, Result};
use crate::core::services::Services;
use crate::core::types::*;

/// Extensions accepted by `/send`
const UPLOAD_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Start a conversation with a greeting from the chat model
pub async fn start_handler(State(services): State<Arc<Services>>) -> Result<Json<StartResponse>> {
    Ok(Json(services.chat.start().await?))
}

/// Answer a question from retrieved documents
///
/// # Errors
///
/// - `InvalidQuery`: prompt missing or blank (400)
/// - `ConversationNotFound`: unknown conversation id (404)
/// - `LlmFailed` / `EmbeddingFailed`: upstream model failure (502)
pub async fn query_handler(
    State(services): State<Arc<Services>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let prompt = req
        .prompt
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| RagError::InvalidQuery("Prompt not provided".to_string()))?;

    let response = services
        .chat
        .query(prompt, req.conversation_id.as_deref(), req.model.as_deref())
        .await?;

    Ok(Json(response))
}

/// Save an uploaded document into the data directory and ingest it
///
/// Expects a multipart form with a `file` field holding a PDF or
/// .docx file. An existing file of the same name is replaced only
/// once the upload has loaded successfully.
pub async fn send_handler(
    State(services): State<Arc<Services>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RagError::InvalidQuery(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = upload_name(field.file_name())?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| RagError::InvalidQuery(format!("Failed to read upload: {e}")))?;

        tracing::debug!("Received upload {} ({} bytes)", file_name, bytes.len());

        let stats = services.ingest_upload(&file_name, bytes.to_vec()).await?;
        return Ok(Json(UploadResponse {
            file: file_name,
            stats,
        }));
    }

    Err(RagError::InvalidQuery("No file provided".to_string()))
}

/// End a conversation and drop its history
pub async fn end_conversation_handler(
    State(services): State<Arc<Services>>,
    Path(conversation_id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    services.conversations.end(&conversation_id)?;

    Ok(Json(DeleteResponse {
        status: "ended".to_string(),
        conversation_id,
    }))
}

/// Ingest the data directory, or the path given in the body
///
/// An empty body ingests the configured data directory.
pub async fn ingest_handler(
    State(services): State<Arc<Services>>,
    body: Bytes,
) -> Result<Json<IngestResponse>> {
    let req: IngestRequest = if body.is_empty() {
        IngestRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| RagError::InvalidQuery(format!("Invalid ingest request: {e}")))?
    };

    let path = req
        .path
        .map(PathBuf::from)
        .unwrap_or_else(|| services.config.storage.data_dir.clone());

    if !path.exists() {
        return Err(RagError::InvalidPath(format!(
            "Path not found: {}",
            path.display()
        )));
    }

    let stats = services.ingest(&path).await?;

    Ok(Json(IngestResponse {
        path: path.display().to_string(),
        stats,
    }))
}

/// Store and conversation statistics
pub async fn stats_handler(State(services): State<Arc<Services>>) -> Json<StatsResponse> {
    Json(services.stats().await)
}

/// Reduce a client-supplied name to a bare, supported file name
fn upload_name(raw: Option<&str>) -> Result<String> {
    let name = raw
        .and_then(|n| FsPath::new(n).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && !n.starts_with('.'))
        .ok_or_else(|| RagError::InvalidQuery("Upload has no file name".to_string()))?;

    let supported = FsPath::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| UPLOAD_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));

    if !supported {
        return Err(RagError::InvalidQuery(format!(
            "Unsupported file type: {name} (expected .pdf or .docx)"
        )));
    }

    Ok(name.to_string())
}
