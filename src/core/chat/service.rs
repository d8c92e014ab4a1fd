//! Retrieval-augmented chat.
//!
//! A query embeds the prompt, pulls the closest chunks from the vector
//! store, wraps them around the question and sends the result as the
//! next user turn of the conversation.

use crate::core::chat::ConversationStore;
use crate::core::config::{ChatConfig, RetrievalConfig};
use crate::core::embedding::EmbeddingBackend;
use crate::core::error::{RagError, Result};
use crate::core::llm::{ChatMessage, ChatModel};
use crate::core::storage::VectorStore;
use crate::core::types::{QueryResponse, RetrievedChunk, StartResponse};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Context used when retrieval returns nothing
pub const NO_DOCUMENTS: &str = "No relevant documents found.";

/// Build the greeting request for the given local timestamp
pub fn greeting_prompt(timestamp: &str) -> String {
    format!(
        "Based on the current time of my system, ignoring the date and only looking at the time \
         in a 24 hour format, construct a greeting message based on the time: {timestamp}"
    )
}

/// Wrap retrieved chunks and the user's question into one user turn
pub fn query_prompt(chunks: &[RetrievedChunk], prompt: &str) -> String {
    let retrieved = chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let retrieved = if retrieved.is_empty() {
        NO_DOCUMENTS
    } else {
        retrieved.as_str()
    };

    format!(
        "Use the following retrieved documents to answer the question, and if no relevant \
         documents were found, include that in response:\n\n{retrieved}\n\nUser: {prompt}\nAI:"
    )
}

/// Greeting and question answering over the vector store
#[derive(Debug)]
pub struct ChatService {
    embedder: Arc<dyn EmbeddingBackend>,
    llm: Arc<dyn ChatModel>,
    store: Arc<RwLock<VectorStore>>,
    conversations: Arc<ConversationStore>,
    top_k: usize,
    max_prompt_length: usize,
}

impl ChatService {
    pub fn new(
        embedder: Arc<dyn EmbeddingBackend>,
        llm: Arc<dyn ChatModel>,
        store: Arc<RwLock<VectorStore>>,
        conversations: Arc<ConversationStore>,
        retrieval: &RetrievalConfig,
        chat: &ChatConfig,
    ) -> Self {
        Self {
            embedder,
            llm,
            store,
            conversations,
            top_k: retrieval.top_k,
            max_prompt_length: chat.max_prompt_length,
        }
    }

    /// Open a conversation with a time-of-day greeting from the default model
    pub async fn start(&self) -> Result<StartResponse> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();
        let conversation_id = self.conversations.create();

        let model = self.llm.default_model().to_string();
        let response = match self
            .turn(&conversation_id, &model, greeting_prompt(&timestamp))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // Nobody holds the id yet, so don't leave it behind
                let _ = self.conversations.end(&conversation_id);
                return Err(e);
            }
        };

        tracing::info!("Started conversation {}", conversation_id);
        Ok(StartResponse {
            response,
            conversation_id,
        })
    }

    /// Answer `prompt` from retrieved context.
    ///
    /// Continues `conversation_id` when given, otherwise starts a new
    /// conversation. `model` overrides the configured chat model.
    ///
    /// # Errors
    ///
    /// `InvalidQuery` for a blank or oversized prompt,
    /// `ConversationNotFound` for an unknown id, and upstream errors
    /// from the embedding backend or chat model.
    pub async fn query(
        &self,
        prompt: &str,
        conversation_id: Option<&str>,
        model: Option<&str>,
    ) -> Result<QueryResponse> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(RagError::InvalidQuery("Prompt not provided".to_string()));
        }
        if prompt.chars().count() > self.max_prompt_length {
            return Err(RagError::InvalidQuery(format!(
                "Prompt exceeds {} characters",
                self.max_prompt_length
            )));
        }

        let (conversation_id, created) = match conversation_id {
            Some(id) if self.conversations.contains(id) => (id.to_string(), false),
            Some(id) => return Err(RagError::ConversationNotFound(id.to_string())),
            None => (self.conversations.create(), true),
        };

        let result = self.answer(&conversation_id, prompt, model).await;
        if result.is_err() && created {
            let _ = self.conversations.end(&conversation_id);
        }
        let (response, chunks) = result?;

        Ok(QueryResponse {
            response,
            conversation_id,
            sources: chunks.into_iter().map(|c| c.id).collect(),
        })
    }

    async fn answer(
        &self,
        conversation_id: &str,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<(String, Vec<RetrievedChunk>)> {
        let chunks = self.retrieve(prompt, self.top_k).await?;
        tracing::debug!(
            "Retrieved {} chunks for conversation {}",
            chunks.len(),
            conversation_id
        );

        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.llm.default_model())
            .to_string();
        let response = self
            .turn(conversation_id, &model, query_prompt(&chunks, prompt))
            .await?;

        Ok((response, chunks))
    }

    /// Top `k` chunks for `text` by cosine similarity
    pub async fn retrieve(&self, text: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        let embedding = self.embedder.embed(text).await?;
        let store = self.store.read().await;
        store.similarity_search(&embedding, k)
    }

    /// Send one user turn; both sides are recorded only on success
    async fn turn(&self, conversation_id: &str, model: &str, content: String) -> Result<String> {
        let user = ChatMessage::user(content);

        let mut messages = self.conversations.history(conversation_id)?;
        messages.push(user.clone());

        let reply = self.llm.chat(model, &messages).await?;

        self.conversations
            .append(conversation_id, [user, ChatMessage::assistant(reply.clone())])?;
        Ok(reply)
    }
}
