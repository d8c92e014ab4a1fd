//! Embedding backend trait definitions

use crate::core::types::Embedding;
use async_trait::async_trait;
use std::fmt::Debug;

/// Errors that can occur during embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model was not found or could not be loaded
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Embedding generation failed
    #[error("Embedding failed: {0}")]
    EmbeddingFailed(String),

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if provided by the API
        retry_after_ms: Option<u64>,
    },

    /// The backend returned vectors of an unexpected length
    #[error("Expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Core trait for embedding backends
///
/// The backend is chosen once at startup and shared as
/// `Arc<dyn EmbeddingBackend>`; every vector it returns has
/// `dimensions()` entries.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync + Debug {
    /// Generate embeddings for a batch of texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>>;

    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("No embedding returned".to_string()))
    }

    /// Get the embedding dimensions
    fn dimensions(&self) -> usize;

    /// Model identity, recorded in the store manifest
    fn model(&self) -> &str;

    /// Get the backend name ("local", "remote", ...)
    fn name(&self) -> &str;

    /// Maximum texts per `embed_batch` call
    fn max_batch_size(&self) -> usize {
        64
    }
}
