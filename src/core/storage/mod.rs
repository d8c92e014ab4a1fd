//! Storage layer: a Tantivy-backed vector store.
//!
//! # Architecture
//!
//! - **VectorStore**: record storage, id enumeration and cosine search
//! - **StoreManifest**: embedding model identity and store statistics
//!
//! # Store Directory Structure
//!
//! ```text
//! {store_dir}/
//! ├── store.json          # Store manifest
//! └── index/              # Tantivy index
//!     ├── meta.json
//!     └── [segment files]
//! ```

mod manifest;
mod vector;

pub use manifest::{StoreManifest, MANIFEST_FILE, SCHEMA_VERSION};
pub use vector::{create_schema, VectorStore};
