//! Document indexing module.
//!
//! Turns loaded documents into persisted vector records:
//!
//! - recursive character splitting into overlapping chunks
//! - deterministic chunk identity (positional or content-hashed)
//! - incremental indexing that only writes unseen ids
//! - pipeline orchestration from a path to ingest statistics
//!
//! Chunk lengths are counted in characters, never bytes, so text with
//! emojis or other multi-byte sequences is split without panicking.

pub mod identity;
pub mod incremental;
pub mod pipeline;
pub mod splitter;

pub use identity::ChunkIdentifier;
pub use incremental::{IncrementalIndexer, IndexOutcome};
pub use pipeline::IngestionPipeline;
pub use splitter::TextSplitter;
