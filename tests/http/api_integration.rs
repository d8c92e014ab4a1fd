//! Integration tests for the ragchat REST API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt as TowerServiceExt;

use crate::common::{docx_bytes, TestEnv};
use ragchat::core::types::*;

const BOUNDARY: &str = "ragchat-test-boundary";

fn app(env: &TestEnv) -> Router {
    ragchat::http::router(env.services.clone())
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn upload_request(file_name: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/send")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1_000_000)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

fn data_dir_entries(env: &TestEnv) -> Vec<String> {
    let mut entries: Vec<String> = std::fs::read_dir(env.data_dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    entries
}

#[tokio::test]
async fn test_health_endpoint() {
    let env = TestEnv::new();

    let (status, body) = send(app(&env), empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_value(body).unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[tokio::test]
async fn test_start_accepts_get_and_post() {
    let env = TestEnv::new();

    for method in ["GET", "POST"] {
        let (status, body) = send(app(&env), empty_request(method, "/start")).await;
        assert_eq!(status, StatusCode::OK);
        let start: StartResponse = serde_json::from_value(body).unwrap();
        assert!(env.services.conversations.contains(&start.conversation_id));
    }

    assert_eq!(env.services.conversations.len(), 2);
}

#[tokio::test]
async fn test_query_without_prompt_is_bad_request() {
    let env = TestEnv::new();

    let (status, body) = send(app(&env), json_request("POST", "/query", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Prompt not provided");
    assert_eq!(body["status"], 400);
    assert!(env.llm.requests().is_empty());
}

#[tokio::test]
async fn test_query_unknown_conversation_is_not_found() {
    let env = TestEnv::new();

    let (status, body) = send(
        app(&env),
        json_request(
            "POST",
            "/query",
            json!({"prompt": "Hello", "conversation_id": "nope"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_conversation_workflow() {
    let env = TestEnv::new();
    let data = env.data_dir();
    std::fs::write(
        data.join("handbook.docx"),
        docx_bytes(&["Vacation requests go to the team lead"]),
    )
    .unwrap();

    // Step 1: ingest the data directory with an empty body
    let (status, body) = send(app(&env), empty_request("POST", "/api/v1/ingest")).await;
    assert_eq!(status, StatusCode::OK);
    let ingest: IngestResponse = serde_json::from_value(body).unwrap();
    assert_eq!(ingest.stats.chunks_added, 1);

    // Step 2: start a conversation
    let (_, body) = send(app(&env), empty_request("POST", "/start")).await;
    let start: StartResponse = serde_json::from_value(body).unwrap();

    // Step 3: ask within it
    let (status, body) = send(
        app(&env),
        json_request(
            "POST",
            "/query",
            json!({
                "prompt": "Who handles vacation requests?",
                "conversation_id": start.conversation_id,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let answer: QueryResponse = serde_json::from_value(body).unwrap();
    assert_eq!(answer.conversation_id, start.conversation_id);
    assert_eq!(answer.response, "reply 2");
    assert_eq!(answer.sources.len(), 1);

    let (_, messages) = env.llm.last_request();
    assert_eq!(messages.len(), 3);
    assert!(messages[2].content.contains("Vacation requests go to the team lead"));

    // Step 4: end it, twice
    let uri = format!("/conversations/{}", start.conversation_id);
    let (status, body) = send(app(&env), empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ended");

    let (status, _) = send(app(&env), empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_saves_and_ingests() {
    let env = TestEnv::new();

    let (status, body) = send(
        app(&env),
        upload_request("../policy.docx", &docx_bytes(&["Uploaded policy text"])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let upload: UploadResponse = serde_json::from_value(body).unwrap();
    assert_eq!(upload.file, "policy.docx");
    assert_eq!(upload.stats.chunks_added, 1);
    assert!(env.data_dir().join("policy.docx").exists());
    assert_eq!(env.services.stats().await.records, 1);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let env = TestEnv::new();

    let (status, _) = send(app(&env), upload_request("notes.txt", b"plain text")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(data_dir_entries(&env).is_empty());
}

#[tokio::test]
async fn test_ingest_missing_path_is_not_found() {
    let env = TestEnv::new();
    let missing = env.dir.path().join("does-not-exist");

    let (status, _) = send(
        app(&env),
        json_request(
            "POST",
            "/api/v1/ingest",
            json!({"path": missing.display().to_string()}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_endpoint() {
    let env = TestEnv::new();
    env.services.conversations.create();

    let (status, body) = send(app(&env), empty_request("GET", "/api/v1/stats")).await;

    assert_eq!(status, StatusCode::OK);
    let stats: StatsResponse = serde_json::from_value(body).unwrap();
    assert_eq!(stats.records, 0);
    assert_eq!(stats.embedding_model, "fake-bow");
    assert_eq!(stats.dimensions, crate::common::FAKE_DIMENSIONS);
    assert_eq!(stats.conversations, 1);
    assert!(stats.last_ingested_at.is_none());
}

#[tokio::test]
async fn test_llm_failure_is_bad_gateway() {
    let env = TestEnv::new();
    env.llm.set_failing(true);

    let (status, body) = send(
        app(&env),
        json_request("POST", "/query", json!({"prompt": "Hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["status"], 502);

    let (status, _) = send(app(&env), empty_request("GET", "/start")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_failed_first_query_leaves_no_conversation() {
    let env = TestEnv::new();
    env.embedder.set_failing(true);

    let (status, _) = send(
        app(&env),
        json_request("POST", "/query", json!({"prompt": "Hello"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(env.services.conversations.is_empty());
}

#[tokio::test]
async fn test_broken_upload_keeps_directory_ingestable() {
    let env = TestEnv::new();
    std::fs::write(
        env.data_dir().join("good.docx"),
        docx_bytes(&["Expense reports are due monthly"]),
    )
    .unwrap();

    let (status, _) = send(app(&env), upload_request("broken.pdf", b"not a pdf")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(data_dir_entries(&env), vec!["good.docx".to_string()]);

    let (status, body) = send(app(&env), empty_request("POST", "/api/v1/ingest")).await;
    assert_eq!(status, StatusCode::OK);
    let ingest: IngestResponse = serde_json::from_value(body).unwrap();
    assert_eq!(ingest.stats.files_loaded, 1);
    assert_eq!(ingest.stats.chunks_added, 1);
}

#[tokio::test]
async fn test_broken_upload_keeps_existing_file() {
    let env = TestEnv::new();
    let original = docx_bytes(&["Original policy"]);

    let (status, _) = send(app(&env), upload_request("policy.docx", &original)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app(&env), upload_request("policy.docx", b"truncated")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(data_dir_entries(&env), vec!["policy.docx".to_string()]);
    assert_eq!(std::fs::read(env.data_dir().join("policy.docx")).unwrap(), original);
    assert_eq!(env.services.stats().await.records, 1);
}
