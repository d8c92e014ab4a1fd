//! Unified service container for ragchat
//!
//! Provides shared access to all core services.

use crate::core::chat::{ChatService, ConversationStore};
use crate::core::config::Config;
use crate::core::embedding::{create_backend, EmbeddingBackend};
use crate::core::error::Result;
use crate::core::indexer::IngestionPipeline;
use crate::core::llm::{ChatModel, OllamaClient};
use crate::core::storage::VectorStore;
use crate::core::types::{IngestStats, StatsResponse};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Unified services container
///
/// All adapters use this same struct for service access.
#[derive(Clone)]
pub struct Services {
    /// Application configuration
    pub config: Arc<Config>,

    /// Embedding backend chosen at startup
    pub embedder: Arc<dyn EmbeddingBackend>,

    /// Chat model client
    pub llm: Arc<dyn ChatModel>,

    /// Vector store; ingestion holds the write lock for a whole run
    pub store: Arc<RwLock<VectorStore>>,

    /// Live conversations
    pub conversations: Arc<ConversationStore>,

    /// Greeting and query answering
    pub chat: Arc<ChatService>,

    /// Loader → Splitter → Identifier → Indexer
    pub pipeline: Arc<IngestionPipeline>,
}

impl Services {
    /// Create services from configuration
    ///
    /// # Errors
    ///
    /// Fails if a backend cannot be built or the store cannot be
    /// opened (including an embedding model mismatch).
    pub fn new(config: Config) -> Result<Self> {
        let embedder = create_backend(&config.embedding)?;
        let llm: Arc<dyn ChatModel> = Arc::new(OllamaClient::new(&config.llm)?);
        Self::with_backends(config, embedder, llm)
    }

    /// Create services around explicit backends
    pub fn with_backends(
        config: Config,
        embedder: Arc<dyn EmbeddingBackend>,
        llm: Arc<dyn ChatModel>,
    ) -> Result<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.storage.data_dir)?;

        let store = VectorStore::open_or_create(
            &config.storage.store_dir,
            embedder.name(),
            embedder.model(),
            embedder.dimensions(),
        )?;
        let store = Arc::new(RwLock::new(store));

        let conversations = Arc::new(ConversationStore::new(config.chat.session_ttl_secs));

        let chat = Arc::new(ChatService::new(
            Arc::clone(&embedder),
            Arc::clone(&llm),
            Arc::clone(&store),
            Arc::clone(&conversations),
            &config.retrieval,
            &config.chat,
        ));

        let pipeline = Arc::new(IngestionPipeline::from_config(
            &config.indexing,
            Arc::clone(&embedder),
        ));

        Ok(Self {
            config: Arc::new(config),
            embedder,
            llm,
            store,
            conversations,
            chat,
            pipeline,
        })
    }

    /// Ingest a directory or file into the store
    pub async fn ingest(&self, path: &Path) -> Result<IngestStats> {
        let mut store = self.store.write().await;
        self.pipeline.ingest_path(&mut store, path).await
    }

    /// Save an uploaded file into the data directory and ingest it.
    ///
    /// The write lock is held from staging to indexing, so no
    /// directory ingestion sees a partially written upload.
    pub async fn ingest_upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<IngestStats> {
        let mut store = self.store.write().await;
        self.pipeline
            .ingest_upload(&mut store, &self.config.storage.data_dir, file_name, bytes)
            .await
    }

    /// Ingest the configured data directory
    pub async fn ingest_data_dir(&self) -> Result<IngestStats> {
        self.ingest(&self.config.storage.data_dir).await
    }

    /// Store and conversation statistics
    pub async fn stats(&self) -> StatsResponse {
        let store = self.store.read().await;
        let manifest = store.manifest();

        StatsResponse {
            records: store.len(),
            embedding_backend: manifest.embedding_backend.clone(),
            embedding_model: manifest.embedding_model.clone(),
            dimensions: manifest.dimensions,
            store_dir: store.dir().display().to_string(),
            store_size_bytes: store.size_bytes(),
            last_ingested_at: manifest.last_ingested_at.map(|t| t.to_rfc3339()),
            conversations: self.conversations.len(),
        }
    }
}
