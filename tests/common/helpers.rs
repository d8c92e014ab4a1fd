// Test helpers: in-process fakes for the embedding backend and chat model

use async_trait::async_trait;
use ragchat::core::config::Config;
use ragchat::core::embedding::{normalize, EmbeddingBackend, EmbeddingError, EmbeddingResult};
use ragchat::core::error::{RagError, Result};
use ragchat::core::llm::{ChatMessage, ChatModel};
use ragchat::core::services::Services;
use ragchat::core::types::Embedding;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Vector length produced by `FakeEmbedder`
#[allow(dead_code)]
pub const FAKE_DIMENSIONS: usize = 32;

/// Bag-of-words embedder: texts sharing words get similar vectors
#[derive(Debug, Default)]
pub struct FakeEmbedder {
    pub calls: AtomicUsize,
    pub texts_embedded: AtomicUsize,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl FakeEmbedder {
    pub fn vector(text: &str) -> Embedding {
        let mut v = vec![0.0f32; FAKE_DIMENSIONS];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = word
                .to_lowercase()
                .bytes()
                .fold(0xcbf29ce484222325u64, |h, b| (h ^ u64::from(b)).wrapping_mul(0x100000001b3));
            v[(hash % FAKE_DIMENSIONS as u64) as usize] += 1.0;
        }
        // Keep empty text off the zero vector
        v[0] += 0.01;
        normalize(&v)
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmbeddingBackend for FakeEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::EmbeddingFailed("embedding service offline".to_string()));
        }
        self.texts_embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        FAKE_DIMENSIONS
    }

    fn model(&self) -> &str {
        "fake-bow"
    }

    fn name(&self) -> &str {
        "fake"
    }

    fn max_batch_size(&self) -> usize {
        8
    }
}

/// Chat model that records every request and answers "reply N"
#[derive(Debug, Default)]
pub struct FakeChatModel {
    pub requests: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl FakeChatModel {
    pub fn requests(&self) -> Vec<(String, Vec<ChatMessage>)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> (String, Vec<ChatMessage>) {
        self.requests().pop().expect("No chat requests recorded")
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RagError::LlmFailed("connection refused".to_string()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push((model.to_string(), messages.to_vec()));
        Ok(format!("reply {}", requests.len()))
    }

    fn default_model(&self) -> &str {
        "llama3.2"
    }
}

/// Services wired to fakes over scratch data and store directories
#[allow(dead_code)]
pub struct TestEnv {
    pub dir: TempDir,
    pub services: Arc<Services>,
    pub embedder: Arc<FakeEmbedder>,
    pub llm: Arc<FakeChatModel>,
}

#[allow(dead_code)]
impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(configure: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.storage.data_dir = dir.path().join("data");
        config.storage.store_dir = dir.path().join("store");
        configure(&mut config);

        let embedder = Arc::new(FakeEmbedder::default());
        let llm = Arc::new(FakeChatModel::default());
        let services = Services::with_backends(config, embedder.clone(), llm.clone())
            .expect("Failed to create services");

        Self {
            dir,
            services: Arc::new(services),
            embedder,
            llm,
        }
    }

    pub fn data_dir(&self) -> std::path::PathBuf {
        self.services.config.storage.data_dir.clone()
    }
}
