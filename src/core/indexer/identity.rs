//! Deterministic chunk identity.
//!
//! The positional scheme numbers chunks within a `{source}:{page}`
//! run: the index resets to 0 whenever the page key differs from the
//! *immediately preceding* chunk, so a page key that reappears later in
//! the sequence starts again from 0. Stores built by earlier versions
//! rely on these exact ids, so the rule is kept as-is.
//!
//! The content scheme hashes the chunk text instead, which makes ids
//! independent of ordering at the cost of compatibility with
//! positional stores.

use crate::core::config::IdentityScheme;
use crate::core::types::Chunk;
use sha2::{Digest, Sha256};

/// Hex digits of the content hash kept in content ids
const CONTENT_HASH_LEN: usize = 16;

/// Assigns ids into chunk metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkIdentifier {
    scheme: IdentityScheme,
}

impl ChunkIdentifier {
    pub fn new(scheme: IdentityScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> IdentityScheme {
        self.scheme
    }

    /// Assign `metadata.id` to every chunk, in iteration order.
    ///
    /// Same input order always yields the same ids.
    pub fn assign(&self, chunks: &mut [Chunk]) {
        match self.scheme {
            IdentityScheme::Positional => assign_positional(chunks),
            IdentityScheme::Content => assign_content(chunks),
        }
    }
}

fn assign_positional(chunks: &mut [Chunk]) {
    let mut last_page_key: Option<String> = None;
    let mut index = 0usize;

    for chunk in chunks.iter_mut() {
        let page_key = chunk.metadata.page_key();

        if last_page_key.as_deref() == Some(page_key.as_str()) {
            index += 1;
        } else {
            index = 0;
        }

        chunk.metadata.id = Some(format!("{page_key}:{index}"));
        last_page_key = Some(page_key);
    }
}

fn assign_content(chunks: &mut [Chunk]) {
    for chunk in chunks.iter_mut() {
        let page_key = chunk.metadata.page_key();
        let hash = content_hash(&page_key, &chunk.content);
        chunk.metadata.id = Some(format!("{page_key}:{hash}"));
    }
}

/// SHA-256 over the page key and whitespace-normalised content
fn content_hash(page_key: &str, content: &str) -> String {
    let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut hasher = Sha256::new();
    hasher.update(page_key.as_bytes());
    hasher.update([0u8]);
    hasher.update(normalized.as_bytes());

    let digest = format!("{:x}", hasher.finalize());
    digest[..CONTENT_HASH_LEN].to_string()
}
