//! Local embedding backend using embed_anything
//!
//! Runs sentence-transformer inference in-process with candle. The
//! model is downloaded from HuggingFace on first use and cached.

use super::normalize;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::core::types::Embedding;
use async_trait::async_trait;
use embed_anything::embeddings::embed::{Embedder, EmbeddingResult as EAResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for the local embedding backend
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Model name ("all-MiniLM-L6-v2" or a HuggingFace model id)
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Texts per inference batch
    pub max_batch_size: usize,
}

/// Local embedding backend
pub struct LocalBackend {
    embedder: Arc<Embedder>,
    config: LocalConfig,
}

impl fmt::Debug for LocalBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalBackend")
            .field("config", &self.config)
            .field("embedder", &"<Embedder>")
            .finish()
    }
}

impl LocalBackend {
    /// Load the model, downloading it if not cached
    pub fn new(config: LocalConfig) -> EmbeddingResult<Self> {
        let model_id = resolve_model_id(&config.model);
        info!("Loading local embedding model: {}", model_id);

        let embedder = Embedder::from_pretrained_hf(&model_id, None, None, None)
            .map_err(|e| EmbeddingError::ModelNotFound(format!("Failed to load model: {e}")))?;

        Ok(Self {
            embedder: Arc::new(embedder),
            config,
        })
    }
}

/// Map short sentence-transformer names to HuggingFace ids
fn resolve_model_id(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("sentence-transformers/{model}")
    }
}

#[async_trait]
impl EmbeddingBackend for LocalBackend {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding batch of {} texts", texts.len());

        let embedder = self.embedder.clone();
        let texts_owned = texts.to_vec();
        let batch_size = self.config.max_batch_size.min(texts.len());

        // Inference is CPU-bound; keep it off the async workers
        let results = tokio::task::spawn_blocking(move || {
            let text_refs: Vec<&str> = texts_owned.iter().map(|s| s.as_str()).collect();
            futures::executor::block_on(embedder.embed(&text_refs, Some(batch_size), None))
        })
        .await
        .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Embedding task failed: {e}")))?
        .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Embedding failed: {e}")))?;

        results
            .into_iter()
            .map(|result| {
                let vector = match result {
                    EAResult::DenseVector(v) => v,
                    EAResult::MultiVector(vecs) => mean_pool(&vecs, self.config.dimensions),
                };
                if vector.len() != self.config.dimensions {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.config.dimensions,
                        actual: vector.len(),
                    });
                }
                Ok(normalize(&vector))
            })
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn name(&self) -> &str {
        "local"
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }
}

fn mean_pool(vecs: &[Vec<f32>], dimensions: usize) -> Vec<f32> {
    let Some(first) = vecs.first() else {
        return vec![0.0; dimensions];
    };

    let mut mean = vec![0.0f32; first.len()];
    for v in vecs {
        for (i, val) in v.iter().enumerate().take(mean.len()) {
            mean[i] += val;
        }
    }
    let count = vecs.len() as f32;
    for val in &mut mean {
        *val /= count;
    }
    mean
}
