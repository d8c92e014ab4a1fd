//! Tests for the one-shot CLI commands

use crate::common::{docx_bytes, TestEnv};
use ragchat::cli::commands::{ask, config, ingest, stats};
use ragchat::cli::OutputFormat;

#[tokio::test]
async fn test_ingest_defaults_to_data_dir() {
    let env = TestEnv::new();
    std::fs::write(env.data_dir().join("faq.docx"), docx_bytes(&["Frequently asked"])).unwrap();

    let args = ingest::IngestArgs {
        path: None,
        file: None,
    };
    ingest::execute(args, &env.services, OutputFormat::Human)
        .await
        .unwrap();

    assert_eq!(env.services.stats().await.records, 1);
}

#[tokio::test]
async fn test_ingest_single_file_json() {
    let env = TestEnv::new();
    let file = env.dir.path().join("single.docx");
    std::fs::write(&file, docx_bytes(&["One file only"])).unwrap();

    let args = ingest::IngestArgs {
        path: None,
        file: Some(file),
    };
    ingest::execute(args, &env.services, OutputFormat::Json)
        .await
        .unwrap();

    assert_eq!(env.services.stats().await.records, 1);
}

#[tokio::test]
async fn test_ingest_missing_path_fails() {
    let env = TestEnv::new();

    let args = ingest::IngestArgs {
        path: Some(env.dir.path().join("nowhere")),
        file: None,
    };
    let result = ingest::execute(args, &env.services, OutputFormat::Human).await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("does not exist"));
}

#[tokio::test]
async fn test_ask_forwards_question_and_model() {
    let env = TestEnv::new();

    let args = ask::AskArgs {
        question: "What is in the handbook?".to_string(),
        model: Some("mistral".to_string()),
        sources: true,
    };
    ask::execute(args, &env.services, OutputFormat::Human)
        .await
        .unwrap();

    let (model, messages) = env.llm.last_request();
    assert_eq!(model, "mistral");
    assert!(messages[0].content.contains("User: What is in the handbook?"));
}

#[tokio::test]
async fn test_ask_reports_llm_failure() {
    let env = TestEnv::new();
    env.llm.set_failing(true);

    let args = ask::AskArgs {
        question: "Anyone there?".to_string(),
        model: None,
        sources: false,
    };
    let result = ask::execute(args, &env.services, OutputFormat::Json).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_stats_both_formats() {
    let env = TestEnv::new();

    for format in [OutputFormat::Human, OutputFormat::Json] {
        stats::execute(stats::StatsArgs {}, &env.services, format)
            .await
            .unwrap();
    }
}

#[test]
fn test_show_config_both_formats() {
    let env = TestEnv::new();

    for format in [OutputFormat::Human, OutputFormat::Json] {
        config::execute(
            config::ConfigArgs { paths: false },
            &env.services.config,
            format,
        )
        .unwrap();
    }
}
