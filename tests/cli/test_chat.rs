//! Tests for the interactive chat session

use crate::common::TestEnv;
use ragchat::cli::commands::chat::{run_session, ChatArgs};
use ragchat::cli::OutputFormat;
use ragchat::core::types::{QueryResponse, StartResponse};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};

fn args(no_greeting: bool) -> ChatArgs {
    ChatArgs {
        model: None,
        no_greeting,
        sources: false,
    }
}

#[tokio::test]
async fn test_session_greets_answers_and_exits() {
    colored::control::set_override(false);
    let env = TestEnv::new();
    let mut out = Vec::new();

    run_session(
        &args(false),
        &env.services,
        OutputFormat::Human,
        &b"hello\nexit\nnever sent\n"[..],
        &mut out,
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("ai> reply 1"));
    assert!(text.contains("ai> reply 2"));
    assert_eq!(env.llm.requests().len(), 2);
    assert!(env.services.conversations.is_empty());
}

#[tokio::test]
async fn test_session_json_lines() {
    let env = TestEnv::new();
    let mut out = Vec::new();

    run_session(
        &args(false),
        &env.services,
        OutputFormat::Json,
        &b"first\n\nsecond\n"[..],
        &mut out,
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);

    let start: StartResponse = serde_json::from_str(lines[0]).unwrap();
    let first: QueryResponse = serde_json::from_str(lines[1]).unwrap();
    let second: QueryResponse = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(first.conversation_id, start.conversation_id);
    assert_eq!(second.conversation_id, start.conversation_id);
    assert_eq!(second.response, "reply 3");

    // Greeting, first turn and second turn all travel with the last request
    let (_, messages) = env.llm.last_request();
    assert_eq!(messages.len(), 5);
}

#[tokio::test]
async fn test_session_survives_failed_turn() {
    colored::control::set_override(false);
    let env = TestEnv::new();
    env.llm.set_failing(true);
    let mut out = Vec::new();

    run_session(
        &args(true),
        &env.services,
        OutputFormat::Human,
        &b"one\ntwo\n/bye\n"[..],
        &mut out,
    )
    .await
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.matches("Error:").count(), 2);
    assert!(env.services.conversations.is_empty());
}

#[tokio::test]
async fn test_session_continues_after_conversation_expires() {
    colored::control::set_override(false);
    let env = TestEnv::with_config(|c| c.chat.session_ttl_secs = 1);
    let (mut input, reader) = tokio::io::duplex(64);
    let mut out = Vec::new();

    let llm = env.llm.clone();
    let feed = async move {
        input.write_all(b"first\n").await.unwrap();
        while llm.requests().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Let the conversation go idle past its ttl
        tokio::time::sleep(Duration::from_millis(1500)).await;
        input.write_all(b"second\n").await.unwrap();
    };
    let chat_args = args(true);
    let session = run_session(
        &chat_args,
        &env.services,
        OutputFormat::Human,
        BufReader::new(reader),
        &mut out,
    );

    let (result, ()) = tokio::join!(session, feed);
    result.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Conversation expired, starting a new one"));
    assert!(text.contains("ai> reply 2"));
    assert!(!text.contains("Error:"));

    // The second question starts from an empty history
    let (_, messages) = env.llm.last_request();
    assert_eq!(messages.len(), 1);
    assert!(env.services.conversations.is_empty());
}
