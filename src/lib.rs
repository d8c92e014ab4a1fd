//! ragchat - Local retrieval-augmented chat over your documents
//!
//! Ingests PDF and Word documents into a persistent vector store and
//! answers questions by retrieving the most relevant chunks and
//! passing them, with the question, to a locally hosted LLM.
//!
//! # Architecture
//!
//! The codebase is organized into three main modules:
//!
//! - **core**: Domain logic (protocol-agnostic)
//!   - config, error, types, xdg
//!   - loader (PDF and .docx extraction)
//!   - indexer (splitting, chunk identity, incremental indexing)
//!   - embedding (remote API and local model backends)
//!   - storage (Tantivy-backed vector store)
//!   - llm, chat (Ollama client, conversations)
//!   - services (unified service container)
//!
//! - **http**: REST API adapter (depends on core)
//!
//! - **cli**: Command-line adapter (depends on core)
//!
//! # Key Features
//!
//! - Deterministic chunk ids, so re-ingestion only embeds new text
//! - Character-based chunking that never splits inside a UTF-8 sequence
//! - Pluggable embedding backends chosen from configuration
//! - Explicit per-conversation chat history

// Core domain logic (protocol-agnostic)
pub mod core;

// HTTP REST adapter
pub mod http;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{RagError, Result};
pub use core::services::Services;
pub use core::types::*;
