//! Conversations and retrieval-augmented answering.

mod conversation;
mod service;

pub use conversation::{Conversation, ConversationStore};
pub use service::{greeting_prompt, query_prompt, ChatService, NO_DOCUMENTS};
