//! In-memory conversation contexts.
//!
//! Each conversation owns its message history. Conversations are
//! created explicitly (greeting or first query), removed on explicit
//! end, and dropped once idle for longer than the configured TTL.

use crate::core::error::{RagError, Result};
use crate::core::llm::ChatMessage;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// One conversation and its history
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            last_active_at: now,
            messages: Vec::new(),
        }
    }

    fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        ttl.is_some_and(|ttl| now - self.last_active_at > ttl)
    }
}

/// Thread-safe map of live conversations
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
    ttl: Option<Duration>,
}

impl ConversationStore {
    /// `ttl_secs = 0` keeps conversations until explicitly ended, as does
    /// a ttl too large to represent
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds);
        Self {
            conversations: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Start an empty conversation and return its id
    pub fn create(&self) -> String {
        let conversation = Conversation::new();
        let id = conversation.id.clone();

        let mut conversations = self.lock();
        self.purge_locked(&mut conversations);
        conversations.insert(id.clone(), conversation);

        tracing::debug!("Created conversation {}", id);
        id
    }

    /// Copy of the message history of `id`
    pub fn history(&self, id: &str) -> Result<Vec<ChatMessage>> {
        let mut conversations = self.lock();
        self.purge_locked(&mut conversations);

        conversations
            .get(id)
            .map(|c| c.messages.clone())
            .ok_or_else(|| RagError::ConversationNotFound(id.to_string()))
    }

    /// Append messages to `id` and mark it active
    pub fn append(&self, id: &str, messages: impl IntoIterator<Item = ChatMessage>) -> Result<()> {
        let mut conversations = self.lock();
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| RagError::ConversationNotFound(id.to_string()))?;

        conversation.messages.extend(messages);
        conversation.last_active_at = Utc::now();
        Ok(())
    }

    /// Discard `id` and its history
    pub fn end(&self, id: &str) -> Result<()> {
        match self.lock().remove(id) {
            Some(_) => {
                tracing::debug!("Ended conversation {}", id);
                Ok(())
            }
            None => Err(RagError::ConversationNotFound(id.to_string())),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        let mut conversations = self.lock();
        self.purge_locked(&mut conversations);
        conversations.contains_key(id)
    }

    /// Live (non-expired) conversations
    pub fn len(&self) -> usize {
        let mut conversations = self.lock();
        self.purge_locked(&mut conversations);
        conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop idle conversations, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        self.purge_locked(&mut self.lock())
    }

    fn purge_locked(&self, conversations: &mut HashMap<String, Conversation>) -> usize {
        let now = Utc::now();
        let before = conversations.len();
        conversations.retain(|_, c| !c.is_expired(self.ttl, now));

        let removed = before - conversations.len();
        if removed > 0 {
            tracing::debug!("Expired {} idle conversations", removed);
        }
        removed
    }

    // A panic while holding the lock leaves the map itself consistent
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn backdate(&self, id: &str, by: Duration) {
        if let Some(c) = self.lock().get_mut(id) {
            c.last_active_at -= by;
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(0)
    }
}
