//! End-to-end ingestion tests: loader → splitter → identity → store

use crate::common::{DataDir, FakeEmbedder, TestEnv};
use ragchat::core::config::IdentityScheme;
use ragchat::core::error::RagError;
use ragchat::core::services::Services;
use ragchat::core::storage::VectorStore;
use ragchat::core::types::{Document, Metadata};
use std::sync::atomic::Ordering;
use std::sync::Arc;

const PAGE_ONE: &str = "alpha bravo charlie delta echo foxtrot golf hotel india juliet";
const PAGE_TWO: &str = "kilo lima mike";

fn small_chunks() -> TestEnv {
    TestEnv::with_config(|c| {
        c.indexing.chunk_size = 40;
        c.indexing.chunk_overlap = 0;
    })
}

async fn sorted_ids(env: &TestEnv) -> Vec<String> {
    let mut ids: Vec<String> = env
        .services
        .store
        .read()
        .await
        .existing_ids()
        .unwrap()
        .into_iter()
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_two_page_pdf_ids_and_rerun() {
    let env = small_chunks();
    let data = env.data_dir();
    std::fs::write(
        data.join("path.pdf"),
        crate::common::pdf_bytes(&[PAGE_ONE, PAGE_TWO]),
    )
    .unwrap();

    let first = env.services.ingest_data_dir().await.unwrap();
    assert_eq!(first.files_loaded, 1);
    assert_eq!(first.documents_loaded, 2);
    assert_eq!(first.chunks_created, 3);
    assert_eq!(first.chunks_added, 3);

    let source = data.join("path.pdf").display().to_string();
    assert_eq!(
        sorted_ids(&env).await,
        vec![
            format!("{source}:0:0"),
            format!("{source}:0:1"),
            format!("{source}:1:0"),
        ]
    );

    let second = env.services.ingest_data_dir().await.unwrap();
    assert_eq!(second.chunks_added, 0);
    assert_eq!(second.chunks_skipped, 3);
}

#[tokio::test]
async fn test_new_file_adds_only_its_chunks() {
    let env = TestEnv::new();
    let data = env.data_dir();
    std::fs::write(data.join("manual.pdf"), crate::common::pdf_bytes(&["Manual text"])).unwrap();
    env.services.ingest_data_dir().await.unwrap();

    let embedded_before = env.embedder.texts_embedded.load(Ordering::SeqCst);
    std::fs::write(data.join("extra.docx"), crate::common::docx_bytes(&["Extra notes"])).unwrap();

    let stats = env.services.ingest_data_dir().await.unwrap();
    assert_eq!(stats.chunks_added, 1);
    assert_eq!(stats.chunks_skipped, 1);
    assert_eq!(
        env.embedder.texts_embedded.load(Ordering::SeqCst) - embedded_before,
        1
    );
    assert_eq!(env.services.stats().await.records, 2);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let env = TestEnv::new();
    let data = env.data_dir();
    std::fs::write(data.join("doc.docx"), crate::common::docx_bytes(&["Persistent text"])).unwrap();
    env.services.ingest_data_dir().await.unwrap();

    let config = (*env.services.config).clone();
    let reopened = Services::with_backends(
        config,
        Arc::new(FakeEmbedder::default()),
        env.llm.clone(),
    )
    .unwrap();

    assert_eq!(reopened.stats().await.records, 1);
    let stats = reopened.ingest_data_dir().await.unwrap();
    assert_eq!(stats.chunks_added, 0);
}

#[tokio::test]
async fn test_embedding_failure_leaves_store_unchanged() {
    let env = TestEnv::new();
    let data = env.data_dir();
    std::fs::write(data.join("doc.docx"), crate::common::docx_bytes(&["Some text"])).unwrap();

    env.embedder.set_failing(true);
    let result = env.services.ingest_data_dir().await;
    assert!(matches!(result, Err(RagError::EmbeddingFailed(_))));
    assert_eq!(env.services.stats().await.records, 0);

    env.embedder.set_failing(false);
    let stats = env.services.ingest_data_dir().await.unwrap();
    assert_eq!(stats.chunks_added, 1);
}

#[tokio::test]
async fn test_empty_data_dir_is_noop() {
    let env = TestEnv::new();

    let stats = env.services.ingest_data_dir().await.unwrap();

    assert_eq!(stats.documents_loaded, 0);
    assert_eq!(stats.chunks_created, 0);
    assert_eq!(env.embedder.calls.load(Ordering::SeqCst), 0);
    assert!(env.services.stats().await.last_ingested_at.is_none());
}

#[tokio::test]
async fn test_content_identity_scheme() {
    let env = TestEnv::with_config(|c| c.indexing.identity = IdentityScheme::Content);
    let data = DataDir::new();
    let path = data.write_docx("hashed.docx", &["Content addressed chunk"]);

    env.services.ingest(&path).await.unwrap();

    let ids = sorted_ids(&env).await;
    assert_eq!(ids.len(), 1);
    let hash = ids[0].rsplit(':').next().unwrap();
    assert_eq!(hash.len(), 16);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(ids[0].starts_with(&format!("{}:None:", path.display())));
}

#[tokio::test]
async fn test_stored_chunks_respect_size_bound() {
    let env = TestEnv::new();
    let text = (0..1500)
        .map(|i| format!("word{i}"))
        .collect::<Vec<_>>()
        .join(" ");
    let docs = vec![Document::new(text, Metadata::new("long.pdf", Some(0)))];

    let stats = {
        let mut store = env.services.store.write().await;
        env.services
            .pipeline
            .ingest_documents(&mut store, &docs)
            .await
            .unwrap()
    };
    assert!(stats.chunks_created > 1);

    let query = FakeEmbedder::vector("word1");
    let store = env.services.store.read().await;
    let all = store.similarity_search(&query, stats.chunks_created).unwrap();
    assert_eq!(all.len(), stats.chunks_created);
    assert!(all.iter().all(|c| c.content.chars().count() <= 800));
}

#[tokio::test]
async fn test_store_rejects_different_embedding_model() {
    let env = TestEnv::new();
    let store_dir = env.services.config.storage.store_dir.clone();

    let result = VectorStore::open_or_create(&store_dir, "fake", "other-model", 32);
    assert!(matches!(result, Err(RagError::StoreError(_))));

    let result = VectorStore::open_or_create(&store_dir, "fake", "fake-bow", 64);
    assert!(matches!(result, Err(RagError::StoreError(_))));
}
