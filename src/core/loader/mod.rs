//! Document loading from PDF and Word files.
//!
//! A directory load reads every PDF at the top level (one document
//! per page), then every .docx file (one document per file). Each
//! group is processed in sorted path order so repeated runs produce
//! the same chunk sequence and therefore the same positional ids.

mod docx;
mod pdf;
mod walker;

pub use docx::load_docx;
pub use pdf::load_pdf;
pub use walker::FileWalker;

use crate::core::config::IndexingConfig;
use crate::core::error::{RagError, Result};
use crate::core::types::Document;
use std::path::Path;

const PDF_PATTERNS: &[&str] = &["*.pdf", "*.PDF"];
const DOCX_PATTERNS: &[&str] = &["*.docx", "*.DOCX"];

/// Word keeps `~$name.docx` lock files next to open documents
const LOCK_FILE_PATTERNS: &[&str] = &["~$*"];

/// Documents produced by a load, with the number of files they came from
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<Document>,
    pub files: usize,
}

/// Loads PDF and .docx files into `Document`s
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    max_file_size_mb: usize,
    include_word_documents: bool,
    recursive: bool,
}

impl DocumentLoader {
    pub fn new(max_file_size_mb: usize, include_word_documents: bool, recursive: bool) -> Self {
        Self {
            max_file_size_mb,
            include_word_documents,
            recursive,
        }
    }

    pub fn from_config(config: &IndexingConfig) -> Self {
        Self::new(
            config.max_file_size_mb,
            config.include_word_documents,
            config.recursive,
        )
    }

    /// Load every supported file in `dir`.
    ///
    /// PDFs come first, then Word documents. An empty directory yields
    /// no documents. A file that fails to load aborts the whole load.
    ///
    /// # Errors
    ///
    /// `InvalidPath` if `dir` is not a directory, `LoadFailed` if any
    /// file cannot be parsed.
    pub fn load_directory(&self, dir: &Path) -> Result<LoadedDocuments> {
        let mut loaded = LoadedDocuments::default();

        let pdfs = self.walker(PDF_PATTERNS)?.collect_files(dir)?;
        for path in &pdfs {
            loaded.documents.extend(load_pdf(path)?);
        }
        loaded.files += pdfs.len();

        if self.include_word_documents {
            let docs = self.walker(DOCX_PATTERNS)?.collect_files(dir)?;
            for path in &docs {
                loaded.documents.extend(load_docx(path)?);
            }
            loaded.files += docs.len();
        }

        tracing::info!(
            "Loaded {} documents from {} files in {}",
            loaded.documents.len(),
            loaded.files,
            dir.display()
        );
        Ok(loaded)
    }

    /// Load a single file, dispatching on its extension
    ///
    /// # Errors
    ///
    /// `InvalidPath` if the file does not exist, `LoadFailed` for an
    /// unsupported extension or a parse failure.
    pub fn load_file(&self, path: &Path) -> Result<LoadedDocuments> {
        if !path.is_file() {
            return Err(RagError::InvalidPath(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let documents = match extension.as_deref() {
            Some("pdf") => load_pdf(path)?,
            Some("docx") if self.include_word_documents => load_docx(path)?,
            _ => {
                return Err(RagError::LoadFailed(format!(
                    "Unsupported file type: {}",
                    path.display()
                )))
            }
        };

        Ok(LoadedDocuments {
            documents,
            files: 1,
        })
    }

    /// Load a directory or a single file
    pub fn load_path(&self, path: &Path) -> Result<LoadedDocuments> {
        if path.is_dir() {
            self.load_directory(path)
        } else {
            self.load_file(path)
        }
    }

    fn walker(&self, patterns: &[&str]) -> Result<FileWalker> {
        Ok(FileWalker::new(patterns, LOCK_FILE_PATTERNS, self.max_file_size_mb)?
            .recursive(self.recursive))
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::from_config(&IndexingConfig::default())
    }
}
