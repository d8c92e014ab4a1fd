//! Text embedding backends
//!
//! - **remote**: OpenAI-compatible `/v1/embeddings` endpoint (Ollama,
//!   OpenAI, LM Studio, vLLM, text-embeddings-inference)
//! - **local**: in-process sentence-transformer model, behind the
//!   `local` cargo feature
//!
//! The backend is selected from `[embedding]` configuration by
//! [`create_backend`].

pub mod factory;
#[cfg(feature = "local")]
pub mod local;
pub mod remote;
pub mod traits;

pub use factory::create_backend;
pub use remote::{RemoteBackend, RemoteConfig};
pub use traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};

use crate::core::types::Embedding;

/// Normalize an embedding vector to unit length
pub fn normalize(embedding: &[f32]) -> Embedding {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.iter().map(|x| x / norm).collect()
    } else {
        embedding.to_vec()
    }
}

/// Cosine similarity between two vectors (0.0 when either is zero)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
