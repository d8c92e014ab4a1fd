//! Tantivy-backed vector store.
//!
//! Each record is one Tantivy document keyed by the chunk id. The
//! embedding is stored as little-endian `f32` bytes and similarity
//! search is an exact cosine scan over every stored vector, which is
//! fast enough for the document collections this service targets.

use crate::core::embedding::cosine_similarity;
use crate::core::error::{RagError, Result};
use crate::core::storage::manifest::StoreManifest;
use crate::core::types::{IndexRecord, RetrievedChunk};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tantivy::collector::DocSetCollector;
use tantivy::query::AllQuery;
use tantivy::schema::*;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use walkdir::WalkDir;

/// Writer heap size (50MB)
const WRITER_HEAP_BYTES: usize = 50_000_000;

/// Index subdirectory inside the store directory
const INDEX_DIR: &str = "index";

/// Create the Tantivy schema for vector records
///
/// Fields:
/// - id: Chunk identity (STRING | STORED | FAST)
/// - content: Chunk text (TEXT | STORED)
/// - source: Source file path (STRING | STORED)
/// - page: Page number, omitted when absent (i64 | STORED)
/// - embedding: f32 little-endian vector (bytes | STORED)
/// - indexed_at: Timestamp (Date | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    builder.add_text_field("id", STRING | STORED | FAST);
    builder.add_text_field("content", TEXT | STORED);
    builder.add_text_field("source", STRING | STORED);
    builder.add_i64_field("page", STORED);
    builder.add_bytes_field("embedding", STORED);
    builder.add_date_field("indexed_at", STORED);

    builder.build()
}

#[derive(Debug, Clone, Copy)]
struct Fields {
    id: Field,
    content: Field,
    source: Field,
    page: Field,
    embedding: Field,
    indexed_at: Field,
}

impl Fields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let get = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| RagError::StoreError(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            id: get("id")?,
            content: get("content")?,
            source: get("source")?,
            page: get("page")?,
            embedding: get("embedding")?,
            indexed_at: get("indexed_at")?,
        })
    }
}

/// Persistent vector store
pub struct VectorStore {
    dir: PathBuf,
    index: Index,
    reader: IndexReader,
    fields: Fields,
    manifest: StoreManifest,
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("dir", &self.dir)
            .field("manifest", &self.manifest)
            .finish()
    }
}

impl VectorStore {
    /// Open the store in `dir`, creating it if it does not exist.
    ///
    /// # Arguments
    ///
    /// * `dir` - Store directory (holds `store.json` and `index/`)
    /// * `backend` - Embedding backend name, recorded on creation
    /// * `model` - Embedding model identity
    /// * `dimensions` - Vector length produced by `model`
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if an existing store was built with a
    /// different model or an older schema, or if the index cannot be
    /// opened.
    pub fn open_or_create(
        dir: &Path,
        backend: &str,
        model: &str,
        dimensions: usize,
    ) -> Result<Self> {
        let index_dir = dir.join(INDEX_DIR);
        let manifest_path = dir.join(crate::core::storage::MANIFEST_FILE);

        let (index, manifest) = if manifest_path.exists() {
            let manifest = StoreManifest::load(dir)?;
            manifest.check_compatible(model, dimensions)?;

            let index = Index::open_in_dir(&index_dir)
                .map_err(|e| RagError::StoreError(format!("Failed to open index: {e}")))?;
            tracing::debug!("Opened vector store at {:?}", dir);
            (index, manifest)
        } else {
            std::fs::create_dir_all(&index_dir)?;

            let index = Index::create_in_dir(&index_dir, create_schema())
                .map_err(|e| RagError::StoreError(format!("Failed to create index: {e}")))?;
            let manifest = StoreManifest::new(backend, model, dimensions);
            manifest.save(dir)?;
            tracing::info!("Created vector store at {:?} ({}, {} dims)", dir, model, dimensions);
            (index, manifest)
        };

        let fields = Fields::resolve(&index.schema())?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| RagError::StoreError(format!("Failed to create reader: {e}")))?;

        Ok(Self {
            dir: dir.to_path_buf(),
            index,
            reader,
            fields,
            manifest,
        })
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Store manifest
    pub fn manifest(&self) -> &StoreManifest {
        &self.manifest
    }

    /// Number of persisted records
    pub fn len(&self) -> usize {
        self.reader.searcher().num_docs() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the store directory on disk, in bytes
    pub fn size_bytes(&self) -> u64 {
        WalkDir::new(&self.dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    /// Read the ids of every live record from the id fast field
    pub fn existing_ids(&self) -> Result<HashSet<String>> {
        let searcher = self.reader.searcher();
        let mut ids = HashSet::with_capacity(searcher.num_docs() as usize);
        let mut id = String::new();

        for segment in searcher.segment_readers() {
            let column = segment
                .fast_fields()
                .str("id")
                .map_err(|e| RagError::StoreError(format!("Failed to open id column: {e}")))?;
            let Some(column) = column else {
                continue;
            };

            for doc in segment.doc_ids_alive() {
                for ord in column.term_ords(doc) {
                    id.clear();
                    column
                        .ord_to_str(ord, &mut id)
                        .map_err(|e| RagError::StoreError(format!("Failed to read id: {e}")))?;
                    ids.insert(id.clone());
                }
            }
        }

        Ok(ids)
    }

    /// Write a batch of records and commit.
    ///
    /// The batch is all-or-nothing: if any record fails to be added the
    /// uncommitted documents are rolled back.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` on a dimension mismatch, if the writer lock
    /// is held by another process, or if the commit fails.
    pub fn add_records(&mut self, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(bad) = records
            .iter()
            .find(|r| r.embedding.len() != self.manifest.dimensions)
        {
            return Err(RagError::StoreError(format!(
                "Record {} has {} dimensions, store expects {}",
                bad.id,
                bad.embedding.len(),
                self.manifest.dimensions
            )));
        }

        let mut writer: IndexWriter = self
            .index
            .writer(WRITER_HEAP_BYTES)
            .map_err(|e| RagError::StoreError(format!("Failed to create writer: {e}")))?;

        if let Err(e) = self.write_batch(&mut writer, records) {
            if let Err(rollback_err) = writer.rollback() {
                tracing::error!("Rollback failed: {}", rollback_err);
            }
            return Err(e);
        }

        self.reader
            .reload()
            .map_err(|e| RagError::StoreError(format!("Failed to reload reader: {e}")))?;

        self.manifest.record_count = self.len();
        self.manifest.last_ingested_at = Some(Utc::now());
        self.manifest.save(&self.dir)?;

        Ok(())
    }

    fn write_batch(&self, writer: &mut IndexWriter, records: &[IndexRecord]) -> Result<()> {
        let indexed_at = tantivy::DateTime::from_timestamp_secs(Utc::now().timestamp());

        for record in records {
            let mut doc = TantivyDocument::default();
            doc.add_text(self.fields.id, &record.id);
            doc.add_text(self.fields.content, &record.content);
            doc.add_text(self.fields.source, &record.metadata.source);
            if let Some(page) = record.metadata.page {
                doc.add_i64(self.fields.page, i64::from(page));
            }
            doc.add_bytes(self.fields.embedding, encode_embedding(&record.embedding));
            doc.add_date(self.fields.indexed_at, indexed_at);

            writer
                .add_document(doc)
                .map_err(|e| RagError::StoreError(format!("Failed to add record: {e}")))?;
        }

        writer
            .commit()
            .map_err(|e| RagError::StoreError(format!("Failed to commit: {e}")))?;

        Ok(())
    }

    /// Return the `k` records most similar to `query` by cosine similarity.
    ///
    /// Results are ordered by descending score, ties broken by id.
    pub fn similarity_search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.reader.searcher();
        let addresses = searcher
            .search(&AllQuery, &DocSetCollector)
            .map_err(|e| RagError::StoreError(format!("Search failed: {e}")))?;

        let mut scored = Vec::with_capacity(addresses.len());
        for address in addresses {
            let doc: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| RagError::StoreError(format!("Failed to read record: {e}")))?;

            let Some(bytes) = doc.get_first(self.fields.embedding).and_then(|v| v.as_bytes())
            else {
                continue;
            };
            let score = cosine_similarity(query, &decode_embedding(bytes));

            scored.push(RetrievedChunk {
                id: extract_text(&doc, self.fields.id),
                content: extract_text(&doc, self.fields.content),
                source: extract_text(&doc, self.fields.source),
                page: doc
                    .get_first(self.fields.page)
                    .and_then(|v| v.as_i64())
                    .and_then(|p| u32::try_from(p).ok()),
                score,
            });
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        scored.truncate(k);

        Ok(scored)
    }
}

fn extract_text(doc: &TantivyDocument, field: Field) -> String {
    doc.get_first(field)
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string()
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
