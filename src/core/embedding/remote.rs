//! Remote embedding backend for OpenAI-compatible APIs
//!
//! Works with any server that implements `POST /v1/embeddings`:
//! Ollama, OpenAI, Azure OpenAI, LM Studio, vLLM and
//! text-embeddings-inference.

use super::normalize;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::core::types::Embedding;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for the remote embedding backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// API endpoint (e.g., "http://localhost:11434/v1/embeddings")
    pub endpoint: String,
    /// API key (optional, falls back to OPENAI_API_KEY)
    pub api_key: Option<String>,
    /// Model name (e.g., "all-minilm")
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum batch size for requests
    pub max_batch_size: usize,
}

/// Remote embedding backend
#[derive(Debug)]
pub struct RemoteBackend {
    client: Client,
    config: RemoteConfig,
}

/// OpenAI embedding request format
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

/// OpenAI embedding response format
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

/// OpenAI error response format
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl RemoteBackend {
    /// Create a new remote embedding backend
    pub fn new(config: RemoteConfig) -> EmbeddingResult<Self> {
        info!(
            "Initializing remote embedding backend: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());

        if let Some(key) = &api_key {
            let auth_value = format!("Bearer {key}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| EmbeddingError::Config(format!("Invalid API key format: {e}")))?,
            );
        } else if config.endpoint.contains("openai.com") || config.endpoint.contains("azure.com")
        {
            warn!("No API key provided for {}", config.endpoint);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    async fn request_embeddings(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            // Only text-embedding-3-* accepts a dimensions parameter
            dimensions: if self.config.model.contains("text-embedding-3") {
                Some(self.config.dimensions)
            } else {
                None
            },
            encoding_format: "float",
        };

        debug!(
            "Sending embedding request to {} for {} texts",
            self.config.endpoint,
            texts.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("HTTP request failed: {e}")))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000);

            return Err(EmbeddingError::RateLimited { retry_after_ms });
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(EmbeddingError::EmbeddingFailed(format!(
                    "API error ({status}): {}",
                    error_response.error.message
                )));
            }

            return Err(EmbeddingError::EmbeddingFailed(format!(
                "HTTP error ({status}): {error_text}"
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            EmbeddingError::EmbeddingFailed(format!("Failed to parse response: {e}"))
        })?;

        if embedding_response.data.len() != texts.len() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "Requested {} embeddings, received {}",
                texts.len(),
                embedding_response.data.len()
            )));
        }

        let mut data = embedding_response.data;
        data.sort_by_key(|d| d.index);

        data.into_iter()
            .map(|d| {
                if d.embedding.len() != self.config.dimensions {
                    return Err(EmbeddingError::DimensionMismatch {
                        expected: self.config.dimensions,
                        actual: d.embedding.len(),
                    });
                }
                Ok(normalize(&d.embedding))
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingBackend for RemoteBackend {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.max_batch_size.max(1)) {
            all_embeddings.extend(self.request_embeddings(batch).await?);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn name(&self) -> &str {
        "remote"
    }

    fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }
}
