//! Ingestion pipeline orchestration.
//!
//! Coordinates the end-to-end ingestion workflow:
//! 1. Load documents from a directory or single file
//! 2. Split documents into chunks
//! 3. Assign chunk ids
//! 4. Index unseen chunks into the vector store

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::core::config::IndexingConfig;
use crate::core::embedding::EmbeddingBackend;
use crate::core::error::{RagError, Result};
use crate::core::indexer::{ChunkIdentifier, IncrementalIndexer, TextSplitter};
use crate::core::loader::{DocumentLoader, LoadedDocuments};
use crate::core::storage::VectorStore;
use crate::core::types::{Document, IngestStats};

/// Orchestrates Loader → Splitter → Identifier → Indexer
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    loader: DocumentLoader,
    splitter: TextSplitter,
    identifier: ChunkIdentifier,
    indexer: IncrementalIndexer,
}

impl IngestionPipeline {
    pub fn new(
        loader: DocumentLoader,
        splitter: TextSplitter,
        identifier: ChunkIdentifier,
        indexer: IncrementalIndexer,
    ) -> Self {
        Self {
            loader,
            splitter,
            identifier,
            indexer,
        }
    }

    /// Build a pipeline from indexing settings.
    ///
    /// Chunk settings must already be validated (`Config::validate`).
    pub fn from_config(config: &IndexingConfig, embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self::new(
            DocumentLoader::from_config(config),
            TextSplitter::new(config.chunk_size, config.chunk_overlap),
            ChunkIdentifier::new(config.identity),
            IncrementalIndexer::new(embedder),
        )
    }

    /// Ingest a directory (PDFs then Word files) or a single file.
    ///
    /// # Errors
    ///
    /// Any load failure aborts the run before anything is written.
    /// Store and embedding failures abort with committed records kept.
    pub async fn ingest_path(&self, store: &mut VectorStore, path: &Path) -> Result<IngestStats> {
        let start = Instant::now();

        tracing::info!("Starting ingestion from {:?}", path);
        let loaded = self.load(path.to_path_buf()).await?;

        let mut stats = self
            .ingest_documents(store, &loaded.documents)
            .await?;
        stats.files_loaded = loaded.files;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Ingestion complete: {} files, {} documents, {} chunks \
             ({} added, {} skipped) in {}ms",
            stats.files_loaded,
            stats.documents_loaded,
            stats.chunks_created,
            stats.chunks_added,
            stats.chunks_skipped,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Split, identify and index already-loaded documents
    pub async fn ingest_documents(
        &self,
        store: &mut VectorStore,
        documents: &[Document],
    ) -> Result<IngestStats> {
        let start = Instant::now();

        let mut chunks = self.splitter.split_documents(documents);
        self.identifier.assign(&mut chunks);
        tracing::debug!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let outcome = self.indexer.index(store, &chunks).await?;

        Ok(IngestStats {
            files_loaded: 0,
            documents_loaded: documents.len(),
            chunks_created: chunks.len(),
            chunks_added: outcome.added,
            chunks_skipped: outcome.skipped,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Add an uploaded file to `data_dir` and ingest it.
    ///
    /// The bytes are written to a hidden staging directory inside
    /// `data_dir` and loaded there first. Only a file that loads is
    /// renamed into place (replacing any file of the same name), so a
    /// bad upload never reaches later directory ingestion.
    ///
    /// # Errors
    ///
    /// `LoadFailed` if the upload cannot be parsed; `data_dir` is left
    /// unchanged in that case.
    pub async fn ingest_upload(
        &self,
        store: &mut VectorStore,
        data_dir: &Path,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<IngestStats> {
        let loader = self.loader.clone();
        let data_dir = data_dir.to_path_buf();
        let file_name = file_name.to_string();

        let path = tokio::task::spawn_blocking(move || {
            stage_upload(&loader, &data_dir, &file_name, &bytes)
        })
        .await
        .map_err(|e| RagError::LoadFailed(format!("Upload task failed: {e}")))??;

        tracing::info!("Saved upload {}", path.display());
        self.ingest_path(store, &path).await
    }

    /// PDF parsing is CPU-bound; keep it off the async workers
    async fn load(&self, path: PathBuf) -> Result<LoadedDocuments> {
        let loader = self.loader.clone();
        tokio::task::spawn_blocking(move || loader.load_path(&path))
            .await
            .map_err(|e| RagError::LoadFailed(format!("Loader task failed: {e}")))?
    }
}

fn stage_upload(
    loader: &DocumentLoader,
    data_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf> {
    // Hidden directories are skipped by the walker
    let staging = tempfile::Builder::new()
        .prefix(".upload-")
        .tempdir_in(data_dir)?;
    let staged = staging.path().join(file_name);
    std::fs::write(&staged, bytes)?;

    loader.load_file(&staged).map_err(|e| match e {
        RagError::LoadFailed(_) | RagError::InvalidPath(_) => {
            RagError::LoadFailed(format!("Rejected upload {file_name}: {e}"))
        }
        other => other,
    })?;

    let target = data_dir.join(file_name);
    std::fs::rename(&staged, &target)?;
    Ok(target)
}
