//! Core domain logic (protocol-agnostic)
//!
//! This module contains all business logic that is independent
//! of transport protocols (HTTP, CLI).
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **loader**: PDF and Word document loading
//! - **indexer**: Splitting, chunk identity and incremental indexing
//! - **embedding**: Embedding backends (remote API, local model)
//! - **storage**: Tantivy-backed vector store
//! - **llm**: Chat model client
//! - **chat**: Conversations and retrieval-augmented answering
//! - **services**: Unified service container

pub mod chat;
pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod llm;
pub mod loader;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{RagError, Result};
pub use services::Services;
