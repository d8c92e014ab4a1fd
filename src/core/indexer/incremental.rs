//! Incremental (deduplicated) indexing into the vector store.
//!
//! Only chunks whose id is not already persisted are embedded and
//! written. Existing records are never rewritten or deleted, so
//! re-running ingestion over unchanged input is a no-op.

use crate::core::embedding::EmbeddingBackend;
use crate::core::error::{RagError, Result};
use crate::core::storage::VectorStore;
use crate::core::types::{Chunk, IndexRecord};
use std::collections::HashSet;
use std::sync::Arc;

/// Counts from one indexing call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOutcome {
    /// Records written
    pub added: usize,

    /// Chunks already in the store, or colliding with an earlier chunk
    /// of the same batch
    pub skipped: usize,
}

/// Writes unseen chunks to the store
#[derive(Debug, Clone)]
pub struct IncrementalIndexer {
    embedder: Arc<dyn EmbeddingBackend>,
}

impl IncrementalIndexer {
    pub fn new(embedder: Arc<dyn EmbeddingBackend>) -> Self {
        Self { embedder }
    }

    /// Persist the chunks whose id is not yet in `store`.
    ///
    /// Input order is preserved. Every vector is computed before the
    /// first write, so an embedding failure leaves the store untouched.
    ///
    /// # Errors
    ///
    /// `StoreError` if a chunk has no id or the write fails,
    /// `EmbeddingFailed` if the backend fails.
    pub async fn index(&self, store: &mut VectorStore, chunks: &[Chunk]) -> Result<IndexOutcome> {
        let existing = store.existing_ids()?;
        tracing::debug!("Store holds {} records", existing.len());

        let new_chunks = select_new(chunks, &existing)?;
        let skipped = chunks.len() - new_chunks.len();

        if new_chunks.is_empty() {
            tracing::info!("No new chunks to add ({} already indexed)", skipped);
            return Ok(IndexOutcome { added: 0, skipped });
        }

        tracing::info!("Adding {} new chunks ({} skipped)", new_chunks.len(), skipped);

        let texts: Vec<String> = new_chunks.iter().map(|c| c.content.clone()).collect();
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.embedder.max_batch_size().max(1)) {
            embeddings.extend(self.embedder.embed_batch(batch).await?);
        }

        if embeddings.len() != new_chunks.len() {
            return Err(RagError::StoreError(format!(
                "Embedding backend returned {} vectors for {} chunks",
                embeddings.len(),
                new_chunks.len()
            )));
        }

        let records: Vec<IndexRecord> = new_chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexRecord {
                id: chunk.id().to_string(),
                content: chunk.content.clone(),
                metadata: chunk.metadata.clone(),
                embedding,
            })
            .collect();

        store.add_records(&records)?;

        Ok(IndexOutcome {
            added: records.len(),
            skipped,
        })
    }
}

/// Chunks not in `existing`, first occurrence wins within the batch
fn select_new<'a>(chunks: &'a [Chunk], existing: &HashSet<String>) -> Result<Vec<&'a Chunk>> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for chunk in chunks {
        let Some(id) = chunk.metadata.id.as_deref() else {
            return Err(RagError::StoreError(format!(
                "Chunk from {} has no id",
                chunk.metadata.page_key()
            )));
        };

        if existing.contains(id) {
            continue;
        }
        if !seen.insert(id) {
            tracing::warn!("Duplicate chunk id in batch, keeping first: {}", id);
            continue;
        }
        selected.push(chunk);
    }

    Ok(selected)
}
