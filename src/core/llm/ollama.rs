//! Ollama chat client (`POST {base_url}/api/chat`, non-streaming)

use super::{ChatMessage, ChatModel};
use crate::core::config::LlmConfig;
use crate::core::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaError {
    error: String,
}

/// Client for a local or remote Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    chat_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        let chat_url = format!("{}/api/chat", config.base_url.trim_end_matches('/'));
        tracing::info!("Chat model: {} via {}", config.model, chat_url);

        Ok(Self {
            client,
            chat_url,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model,
            messages,
            stream: false,
        };

        tracing::debug!("Sending {} messages to {}", messages.len(), model);

        let response = self
            .client
            .post(&self.chat_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::LlmFailed(format!("Request to {} failed: {e}", self.chat_url)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<OllamaError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(RagError::LlmFailed(format!("{model} ({status}): {detail}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagError::LlmFailed(format!("Malformed chat response: {e}")))?;

        Ok(reply.message.content)
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}
