//! Document loader tests on generated PDF and .docx files

use crate::common::DataDir;
use ragchat::core::error::RagError;
use ragchat::core::loader::{load_docx, load_pdf, DocumentLoader};

#[test]
fn test_pdf_one_document_per_page() {
    let data = DataDir::new();
    let path = data.write_pdf("guide.pdf", &["First page text", "Second page text"]);

    let docs = load_pdf(&path).unwrap();

    assert_eq!(docs.len(), 2);
    assert!(docs[0].content.contains("First page"));
    assert!(docs[1].content.contains("Second page"));
    assert_eq!(docs[0].metadata.page, Some(0));
    assert_eq!(docs[1].metadata.page, Some(1));
    assert_eq!(docs[0].metadata.source, path.display().to_string());
}

#[test]
fn test_docx_single_document_without_page() {
    let data = DataDir::new();
    let path = data.write_docx("notes.docx", &["Opening paragraph", "Closing paragraph"]);

    let docs = load_docx(&path).unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Opening paragraph\n\nClosing paragraph");
    assert_eq!(docs[0].metadata.page, None);
}

#[test]
fn test_directory_loads_pdfs_then_word_files() {
    let data = DataDir::new();
    data.write_docx("a-notes.docx", &["Word text"]);
    data.write_pdf("z-manual.pdf", &["Manual page"]);
    data.write_pdf("b-intro.pdf", &["Intro page"]);
    data.write("readme.txt", b"ignored");

    let loaded = DocumentLoader::default().load_directory(data.path()).unwrap();

    assert_eq!(loaded.files, 3);
    let sources: Vec<&str> = loaded
        .documents
        .iter()
        .map(|d| d.metadata.source.as_str())
        .collect();
    assert!(sources[0].ends_with("b-intro.pdf"));
    assert!(sources[1].ends_with("z-manual.pdf"));
    assert!(sources[2].ends_with("a-notes.docx"));
}

#[test]
fn test_word_lock_files_are_ignored() {
    let data = DataDir::new();
    data.write_docx("report.docx", &["Report"]);
    data.write("~$report.docx", b"lock");

    let loaded = DocumentLoader::default().load_directory(data.path()).unwrap();
    assert_eq!(loaded.files, 1);
}

#[test]
fn test_corrupt_file_aborts_directory_load() {
    let data = DataDir::new();
    data.write_pdf("good.pdf", &["Fine"]);
    data.write("bad.pdf", b"%PDF-1.4 truncated");

    let result = DocumentLoader::default().load_directory(data.path());
    assert!(matches!(result, Err(RagError::LoadFailed(_))));
}

#[test]
fn test_single_file_load() {
    let data = DataDir::new();
    let path = data.write_docx("one.docx", &["Only file"]);

    let loaded = DocumentLoader::default().load_path(&path).unwrap();
    assert_eq!(loaded.files, 1);
    assert_eq!(loaded.documents[0].content, "Only file");
}
