//! PDF text extraction, one document per page.

use crate::core::error::{RagError, Result};
use crate::core::types::{Document, Metadata};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Load a PDF into one `Document` per page.
///
/// Pages are numbered from 0. Pages without extractable text still
/// produce a (blank) document so page numbers stay aligned.
///
/// # Errors
///
/// Returns `LoadFailed` if the file cannot be read or parsed.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>> {
    let bytes = fs::read(path)
        .map_err(|e| RagError::LoadFailed(format!("{}: {e}", path.display())))?;
    let source = path.display().to_string();

    let pages = extract_pages(&bytes).map_err(|e| RagError::LoadFailed(format!("{source}: {e}")))?;

    let documents = pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| {
            Document::new(
                clean_text(&text),
                Metadata::new(source.clone(), Some(page as u32)),
            )
        })
        .collect::<Vec<_>>();

    tracing::debug!("Loaded {} pages from {}", documents.len(), source);
    Ok(documents)
}

fn extract_pages(bytes: &[u8]) -> std::result::Result<Vec<String>, String> {
    // pdf-extract panics on some malformed inputs
    panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| "PDF parser panicked on malformed input".to_string())?
    .map_err(|e| format!("Failed to extract text from PDF: {e}"))
}

/// Trim each line and collapse runs of blank lines to one.
fn clean_text(text: &str) -> String {
    text.lines()
        .map(|l| l.trim())
        .fold(Vec::new(), |mut acc: Vec<&str>, line| {
            if line.is_empty() {
                if acc.last().is_some_and(|l| !l.is_empty()) {
                    acc.push("");
                }
            } else {
                acc.push(line);
            }
            acc
        })
        .join("\n")
        .trim()
        .to_string()
}
