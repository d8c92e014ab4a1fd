//! Error types and error handling for the ragchat service.
//!
//! This module defines the error types used throughout the
//! application. Protocol-specific error handling (HTTP status codes)
//! is handled in the respective adapter modules.

use thiserror::Error;

use crate::core::embedding::EmbeddingError;

/// Result type alias for ragchat operations
pub type Result<T> = std::result::Result<T, RagError>;

/// Main error type for the ragchat service
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to load document: {0}")]
    LoadFailed(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Embedding backend error: {0}")]
    EmbeddingFailed(#[from] EmbeddingError),

    #[error("Chat model request failed: {0}")]
    LlmFailed(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl RagError {
    /// Get user-friendly error message (invalid input is reported verbatim)
    pub fn message(&self) -> String {
        match self {
            RagError::InvalidQuery(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RagError::ConversationNotFound(_) | RagError::InvalidPath(_)
        )
    }

    /// Check if this is a bad request error (invalid input)
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            RagError::InvalidQuery(_) | RagError::ConfigError(_) | RagError::LoadFailed(_)
        )
    }

    /// Check if the failure came from an upstream model service
    pub fn is_upstream(&self) -> bool {
        matches!(self, RagError::LlmFailed(_) | RagError::EmbeddingFailed(_))
    }
}
