//! Chat service tests: retrieval, prompt assembly and conversation history

use crate::common::TestEnv;
use ragchat::core::chat::NO_DOCUMENTS;
use ragchat::core::error::RagError;
use ragchat::core::llm::{ChatMessage, Role};
use ragchat::core::types::{Document, Metadata};

async fn seed(env: &TestEnv) {
    let docs = vec![
        Document::new("cats purr softly on warm sofas", Metadata::new("pets.pdf", Some(0))),
        Document::new("rockets launch into orbit fast", Metadata::new("space.pdf", Some(0))),
        Document::new("ocean waves crash on the shore", Metadata::new("sea.docx", None)),
    ];
    let mut store = env.services.store.write().await;
    env.services
        .pipeline
        .ingest_documents(&mut store, &docs)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_retrieve_ranks_closest_chunk_first() {
    let env = TestEnv::new();
    seed(&env).await;

    let hits = env.services.chat.retrieve("when do rockets launch", 2).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "space.pdf:0:0");
    assert_eq!(hits[0].page, Some(0));
    assert!(hits[0].score >= hits[1].score);
}

#[tokio::test]
async fn test_query_sends_retrieved_context_to_model() {
    let env = TestEnv::with_config(|c| c.retrieval.top_k = 1);
    seed(&env).await;

    let response = env
        .services
        .chat
        .query("Why do cats purr?", None, None)
        .await
        .unwrap();

    assert_eq!(response.response, "reply 1");
    assert_eq!(response.sources, vec!["pets.pdf:0:0".to_string()]);

    let (model, messages) = env.llm.last_request();
    assert_eq!(model, "llama3.2");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, Role::User);
    assert!(messages[0].content.contains("cats purr softly on warm sofas"));
    assert!(messages[0].content.ends_with("User: Why do cats purr?\nAI:"));
    assert!(!messages[0].content.contains("rockets"));
}

#[tokio::test]
async fn test_query_on_empty_store_says_no_documents() {
    let env = TestEnv::new();

    let response = env.services.chat.query("Anything?", None, None).await.unwrap();

    assert!(response.sources.is_empty());
    let (_, messages) = env.llm.last_request();
    assert!(messages[0].content.contains(NO_DOCUMENTS));
}

#[tokio::test]
async fn test_history_grows_across_turns() {
    let env = TestEnv::new();
    seed(&env).await;

    let first = env.services.chat.query("Tell me about waves", None, None).await.unwrap();
    let id = first.conversation_id.clone();
    let second = env
        .services
        .chat
        .query("And rockets?", Some(&id), None)
        .await
        .unwrap();

    assert_eq!(second.conversation_id, id);
    let (_, messages) = env.llm.last_request();
    let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    assert_eq!(messages[1], ChatMessage::assistant("reply 1"));

    let history = env.services.conversations.history(&id).unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_unknown_conversation_is_rejected() {
    let env = TestEnv::new();

    let result = env.services.chat.query("Hello", Some("missing"), None).await;

    assert!(matches!(result, Err(RagError::ConversationNotFound(_))));
    assert!(env.llm.requests().is_empty());
}

#[tokio::test]
async fn test_blank_and_oversized_prompts() {
    let env = TestEnv::with_config(|c| c.chat.max_prompt_length = 10);

    let blank = env.services.chat.query("   ", None, None).await;
    match blank {
        Err(e @ RagError::InvalidQuery(_)) => assert_eq!(e.message(), "Prompt not provided"),
        other => panic!("expected InvalidQuery, got {other:?}"),
    }

    let long = env.services.chat.query("a prompt that is too long", None, None).await;
    assert!(matches!(long, Err(RagError::InvalidQuery(_))));
    assert!(env.services.conversations.is_empty());
}

#[tokio::test]
async fn test_model_override_is_forwarded() {
    let env = TestEnv::new();

    env.services
        .chat
        .query("Hi", None, Some("mistral"))
        .await
        .unwrap();

    let (model, _) = env.llm.last_request();
    assert_eq!(model, "mistral");
}

#[tokio::test]
async fn test_llm_failure_keeps_history_clean() {
    let env = TestEnv::new();
    let first = env.services.chat.query("First question", None, None).await.unwrap();

    env.llm.set_failing(true);
    let result = env
        .services
        .chat
        .query("Second question", Some(&first.conversation_id), None)
        .await;
    assert!(matches!(result, Err(RagError::LlmFailed(_))));

    let history = env
        .services
        .conversations
        .history(&first.conversation_id)
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_start_greets_with_timestamp() {
    let env = TestEnv::new();

    let start = env.services.chat.start().await.unwrap();

    assert_eq!(start.response, "reply 1");
    assert!(env.services.conversations.contains(&start.conversation_id));
    let (_, messages) = env.llm.last_request();
    assert!(messages[0]
        .content
        .starts_with("Based on the current time of my system"));
}

#[tokio::test]
async fn test_failed_start_leaves_no_conversation() {
    let env = TestEnv::new();
    env.llm.set_failing(true);

    let result = env.services.chat.start().await;

    assert!(matches!(result, Err(RagError::LlmFailed(_))));
    assert!(env.services.conversations.is_empty());
}
