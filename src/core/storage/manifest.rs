//! Store manifest (`store.json`).
//!
//! Records which embedding model produced the vectors in a store.
//! Vectors from different models live in different spaces, so a store
//! is only ever opened with the model that created it.

use crate::core::error::{RagError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Current store schema version
/// Version 1: id/content/source/page/embedding/indexed_at fields
/// Version 2: id becomes a fast field
pub const SCHEMA_VERSION: u32 = 2;

/// Manifest file name inside the store directory
pub const MANIFEST_FILE: &str = "store.json";

/// Store manifest (Schema v2)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreManifest {
    pub schema_version: u32,
    pub embedding_backend: String,
    pub embedding_model: String,
    pub dimensions: usize,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_ingested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub record_count: usize,
}

impl StoreManifest {
    pub fn new(backend: &str, model: &str, dimensions: usize) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            embedding_backend: backend.to_string(),
            embedding_model: model.to_string(),
            dimensions,
            created_at: Utc::now(),
            last_ingested_at: None,
            record_count: 0,
        }
    }

    /// Read the manifest from a store directory
    pub fn load(store_dir: &Path) -> Result<Self> {
        let path = store_dir.join(MANIFEST_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| {
            RagError::StoreError(format!("Failed to read manifest {}: {e}", path.display()))
        })?;
        let manifest: StoreManifest = serde_json::from_str(&contents)?;
        Ok(manifest)
    }

    /// Write the manifest into a store directory
    pub fn save(&self, store_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(store_dir.join(MANIFEST_FILE), json)?;
        Ok(())
    }

    /// Check that a store built with this manifest can serve `model`
    pub fn check_compatible(&self, model: &str, dimensions: usize) -> Result<()> {
        if self.schema_version < SCHEMA_VERSION {
            return Err(RagError::StoreError(format!(
                "Store uses old schema version {} (current: v{}). \
                 Delete the store directory and re-run ingestion.",
                self.schema_version, SCHEMA_VERSION
            )));
        }

        if self.embedding_model != model || self.dimensions != dimensions {
            return Err(RagError::StoreError(format!(
                "Store was built with embedding model '{}' ({} dims) but '{}' ({} dims) is configured. \
                 Use the original model or point storage.store_dir at a new directory.",
                self.embedding_model, self.dimensions, model, dimensions
            )));
        }

        Ok(())
    }
}
