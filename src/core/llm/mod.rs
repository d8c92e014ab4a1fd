//! Chat model client.
//!
//! The chat service talks to the LLM through the [`ChatModel`] trait;
//! [`OllamaClient`] implements it against Ollama's `/api/chat`.

mod ollama;

pub use ollama::OllamaClient;

use crate::core::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion model
#[async_trait]
pub trait ChatModel: Send + Sync + Debug {
    /// Send the full message history to `model` and return the reply text
    ///
    /// # Errors
    ///
    /// `LlmFailed` if the model service is unreachable, times out or
    /// answers with an error.
    async fn chat(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;

    /// Model used when a request does not name one
    fn default_model(&self) -> &str;
}
