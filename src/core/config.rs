//! Configuration management for the ragchat service.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.

use crate::core::error::{RagError, Result};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub indexing: IndexingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Chunk identity scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityScheme {
    /// `{source}:{page}:{index}`, index resets when the page key changes
    #[default]
    Positional,
    /// `{source}:{page}:{sha256 prefix of content}`
    Content,
}

impl fmt::Display for IdentityScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityScheme::Positional => write!(f, "positional"),
            IdentityScheme::Content => write!(f, "content"),
        }
    }
}

impl std::str::FromStr for IdentityScheme {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "positional" => Ok(IdentityScheme::Positional),
            "content" => Ok(IdentityScheme::Content),
            other => Err(RagError::ConfigError(format!(
                "Unknown identity scheme '{other}' (expected positional or content)"
            ))),
        }
    }
}

/// Indexing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexingConfig {
    /// Characters per chunk (not bytes!)
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Character overlap between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum file size in MB (skip larger files)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: usize,

    /// Also load Word (.docx) files alongside PDFs
    #[serde(default = "default_true")]
    pub include_word_documents: bool,

    /// Descend into subdirectories of the data directory
    #[serde(default)]
    pub recursive: bool,

    /// How chunk ids are derived
    #[serde(default)]
    pub identity: IdentityScheme,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory holding source documents (and uploads)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding the persistent vector store
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

/// Embedding backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackendKind {
    /// In-process model (requires the `local` feature)
    Local,
    /// OpenAI-compatible embeddings endpoint
    #[default]
    Remote,
}

impl fmt::Display for EmbeddingBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingBackendKind::Local => write!(f, "local"),
            EmbeddingBackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Backend: "local" or "remote"
    #[serde(default)]
    pub backend: EmbeddingBackendKind,

    /// Model identity (HuggingFace id for local, API model name for remote)
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimensions produced by the model
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Remote backend: embeddings endpoint URL
    #[serde(default = "default_embedding_endpoint")]
    pub endpoint: String,

    /// Remote backend: API key (falls back to OPENAI_API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum texts per embedding request
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

/// Chat model configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Ollama base URL
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Default chat model
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

/// Retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Chunks passed to the model as context
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound for top_k
    #[serde(default = "default_max_k")]
    pub max_k: usize,
}

/// Conversation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Idle seconds before a conversation is discarded
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// Maximum prompt length in characters
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: usize,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Ingest the data directory before serving
    #[serde(default = "default_true")]
    pub ingest_on_startup: bool,

    /// Maximum upload size in MB
    #[serde(default = "default_max_upload")]
    pub max_upload_mb: usize,
}

// Default value functions
fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    70
}

fn default_max_file_size() -> usize {
    50
}

fn default_true() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("./store")
}

fn default_embedding_model() -> String {
    "all-minilm".to_string()
}

fn default_dimensions() -> usize {
    384
}

fn default_embedding_endpoint() -> String {
    "http://localhost:11434/v1/embeddings".to_string()
}

fn default_embedding_timeout() -> u64 {
    30
}

fn default_max_batch_size() -> usize {
    64
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2".to_string()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_top_k() -> usize {
    3
}

fn default_max_k() -> usize {
    20
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_max_prompt_length() -> usize {
    8000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_upload() -> usize {
    50
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_file_size_mb: default_max_file_size(),
            include_word_documents: true,
            recursive: false,
            identity: IdentityScheme::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store_dir: default_store_dir(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackendKind::default(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            endpoint: default_embedding_endpoint(),
            api_key: None,
            timeout_secs: default_embedding_timeout(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_k: default_max_k(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl(),
            max_prompt_length: default_max_prompt_length(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ingest_on_startup: true,
            max_upload_mb: default_max_upload(),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| RagError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. RAGCHAT_CONFIG env var
    /// 2. XDG config file (~/.config/ragchat/config.toml)
    /// 3. ./ragchat.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("RAGCHAT_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("ragchat.toml").exists() {
                Self::from_file("ragchat.toml")?
            } else {
                Self::default()
            }
        };

        // Keep the store under XDG data unless it was set explicitly
        if env::var("RAGCHAT_STORE_DIR").is_err() && config.storage.store_dir == default_store_dir()
        {
            config.storage.store_dir = xdg.store_dir();
        }

        config.merge_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) -> Result<()> {
        // Indexing configuration
        if let Some(size) = parse_env("RAGCHAT_CHUNK_SIZE") {
            self.indexing.chunk_size = size;
        }
        if let Some(overlap) = parse_env("RAGCHAT_CHUNK_OVERLAP") {
            self.indexing.chunk_overlap = overlap;
        }
        if let Some(size) = parse_env("RAGCHAT_MAX_FILE_SIZE_MB") {
            self.indexing.max_file_size_mb = size;
        }
        if let Ok(identity) = env::var("RAGCHAT_IDENTITY") {
            self.indexing.identity = identity.parse()?;
        }

        // Storage configuration
        if let Ok(data_dir) = env::var("RAGCHAT_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }
        if let Ok(store_dir) = env::var("RAGCHAT_STORE_DIR") {
            self.storage.store_dir = PathBuf::from(store_dir);
        }

        // Embedding configuration
        if let Ok(endpoint) = env::var("RAGCHAT_EMBEDDING_ENDPOINT") {
            self.embedding.endpoint = endpoint;
        }
        if let Ok(model) = env::var("RAGCHAT_EMBEDDING_MODEL") {
            self.embedding.model = model;
        }
        if let Some(dims) = parse_env("RAGCHAT_EMBEDDING_DIMENSIONS") {
            self.embedding.dimensions = dims;
        }

        // LLM configuration
        if let Ok(base_url) = env::var("RAGCHAT_LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Ok(model) = env::var("RAGCHAT_LLM_MODEL") {
            self.llm.model = model;
        }

        // Retrieval configuration
        if let Some(k) = parse_env("RAGCHAT_TOP_K") {
            self.retrieval.top_k = k;
        }

        // Server configuration
        if let Ok(host) = env::var("RAGCHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = parse_env("RAGCHAT_PORT") {
            self.server.port = port;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.indexing.chunk_size == 0 {
            return Err(RagError::ConfigError(
                "Chunk size must be non-zero".to_string(),
            ));
        }

        if self.indexing.chunk_overlap >= self.indexing.chunk_size {
            return Err(RagError::ConfigError(
                "Chunk overlap must be less than chunk size".to_string(),
            ));
        }

        if self.embedding.dimensions == 0 {
            return Err(RagError::ConfigError(
                "Embedding dimensions must be non-zero".to_string(),
            ));
        }

        if self.embedding.max_batch_size == 0 {
            return Err(RagError::ConfigError(
                "Embedding batch size must be non-zero".to_string(),
            ));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(RagError::ConfigError(
                "Embedding model must be set".to_string(),
            ));
        }

        if self.retrieval.top_k == 0 {
            return Err(RagError::ConfigError("Top k must be non-zero".to_string()));
        }

        if self.retrieval.top_k > self.retrieval.max_k {
            return Err(RagError::ConfigError(
                "Top k cannot exceed max k".to_string(),
            ));
        }

        if self.llm.timeout_secs == 0 || self.embedding.timeout_secs == 0 {
            return Err(RagError::ConfigError(
                "Request timeouts must be non-zero".to_string(),
            ));
        }

        if i64::try_from(self.chat.session_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .is_none()
        {
            return Err(RagError::ConfigError(format!(
                "Session TTL of {}s is out of range",
                self.chat.session_ttl_secs
            )));
        }

        if self.chat.max_prompt_length == 0 {
            return Err(RagError::ConfigError(
                "Max prompt length must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration (redacting sensitive values)
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Chunk size: {} chars", self.indexing.chunk_size);
        tracing::info!("  Chunk overlap: {} chars", self.indexing.chunk_overlap);
        tracing::info!("  Identity scheme: {}", self.indexing.identity);
        tracing::info!("  Max file size: {} MB", self.indexing.max_file_size_mb);
        tracing::info!("  Data dir: {:?}", self.storage.data_dir);
        tracing::info!("  Store dir: {:?}", self.storage.store_dir);
        tracing::info!(
            "  Embedding: {} ({}, {} dims)",
            self.embedding.backend,
            self.embedding.model,
            self.embedding.dimensions
        );
        if self.embedding.backend == EmbeddingBackendKind::Remote {
            tracing::info!("  Embedding endpoint: {}", self.embedding.endpoint);
            tracing::info!(
                "  Embedding API key: {}",
                if self.embedding.api_key.is_some() {
                    "[REDACTED]"
                } else {
                    "not set"
                }
            );
        }
        tracing::info!("  LLM: {} at {}", self.llm.model, self.llm.base_url);
        tracing::info!("  Top k: {}", self.retrieval.top_k);
        tracing::info!("  Session TTL: {}s", self.chat.session_ttl_secs);
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
