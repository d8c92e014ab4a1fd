//! Core data types for the ragchat service.
//!
//! This module defines the data structures that flow through the
//! ingestion pipeline (documents, chunks, index records) and the
//! request/response bodies shared by the HTTP and CLI adapters.

use serde::{Deserialize, Serialize};

/// Dense embedding vector
pub type Embedding = Vec<f32>;

/// Rendering used for an absent page or source in identity keys
pub const MISSING_FIELD: &str = "None";

/// Metadata carried by documents and inherited by their chunks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// File path the text was loaded from
    pub source: String,

    /// Zero-based page number (absent for non-paginated formats)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Chunk identity, assigned after splitting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Metadata {
    pub fn new(source: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            source: source.into(),
            page,
            id: None,
        }
    }

    /// `{source}:{page}` key used to group chunks for identity
    pub fn page_key(&self) -> String {
        let source = if self.source.is_empty() {
            MISSING_FIELD
        } else {
            self.source.as_str()
        };
        match self.page {
            Some(page) => format!("{source}:{page}"),
            None => format!("{source}:{MISSING_FIELD}"),
        }
    }
}

/// A loaded unit of text (one PDF page or one Word file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: Metadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// A bounded window of a document's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The actual text content
    pub content: String,

    /// Metadata inherited from the source document, plus `id`
    pub metadata: Metadata,
}

impl Chunk {
    /// Assigned identity, empty until the identifier has run
    pub fn id(&self) -> &str {
        self.metadata.id.as_deref().unwrap_or("")
    }
}

/// Persisted unit in the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub embedding: Embedding,
}

/// A record returned by similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Chunk identity
    pub id: String,

    /// Chunk text content
    pub content: String,

    /// Source file path
    pub source: String,

    /// Page number, if the source is paginated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Cosine similarity (higher = more relevant)
    pub score: f32,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestStats {
    /// Files successfully loaded
    pub files_loaded: usize,

    /// Documents produced by the loader (pages for PDFs)
    pub documents_loaded: usize,

    /// Chunks produced by the splitter
    pub chunks_created: usize,

    /// Chunks written to the store
    pub chunks_added: usize,

    /// Chunks already present (or colliding) and not written
    pub chunks_skipped: usize,

    /// Run duration in milliseconds
    pub duration_ms: u64,
}

/// Request body for `/query`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    /// User question
    #[serde(default)]
    pub prompt: Option<String>,

    /// Conversation to continue (a new one is created when absent)
    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Override of the configured chat model
    #[serde(default)]
    pub model: Option<String>,
}

/// Response body for `/query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Assistant reply
    pub response: String,

    /// Conversation the turn was recorded in
    pub conversation_id: String,

    /// Ids of the chunks used as context
    #[serde(default)]
    pub sources: Vec<String>,
}

/// Response body for `/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    /// Greeting generated by the chat model
    pub response: String,

    /// Newly created conversation
    pub conversation_id: String,
}

/// Request body for `/api/v1/ingest`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Directory to ingest (defaults to the configured data directory)
    #[serde(default)]
    pub path: Option<String>,
}

/// Response body for ingestion routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Directory or file that was ingested
    pub path: String,

    #[serde(flatten)]
    pub stats: IngestStats,
}

/// Response body for `/send`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Saved file name inside the data directory
    pub file: String,

    #[serde(flatten)]
    pub stats: IngestStats,
}

/// Store statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    /// Records in the vector store
    pub records: usize,

    /// Embedding backend name
    pub embedding_backend: String,

    /// Embedding model identity
    pub embedding_model: String,

    /// Vector dimensions
    pub dimensions: usize,

    /// Store directory
    pub store_dir: String,

    /// On-disk size of the store
    pub store_size_bytes: u64,

    /// Time of the last ingestion that added records (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_ingested_at: Option<String>,

    /// Open conversations
    pub conversations: usize,
}

/// Response from ending a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Status message
    pub status: String,

    /// Conversation that was ended
    pub conversation_id: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}
