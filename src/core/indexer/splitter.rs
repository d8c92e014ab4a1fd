//! Recursive character text splitting.
//!
//! Documents are split on the coarsest separator that occurs in the
//! text (paragraphs, then lines, then words, then characters) and the
//! resulting pieces are merged back into windows of at most
//! `chunk_size` characters, with up to `chunk_overlap` characters of
//! trailing context repeated at the start of the next window.
//!
//! All lengths are measured in **characters**, not bytes, so splitting
//! never lands inside a multi-byte UTF-8 sequence.
//!
//! # Example
//!
//! ```
//! use ragchat::core::indexer::TextSplitter;
//!
//! let splitter = TextSplitter::new(10, 4);
//! let chunks = splitter.split_text("aaa bbb ccc ddd");
//! assert_eq!(chunks, vec!["aaa bbb", "bbb ccc", "ccc ddd"]);
//! ```

use crate::core::types::{Chunk, Document};
use std::collections::VecDeque;

/// Separators tried in order, coarsest first
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character splitter.
///
/// Separators are kept at the start of the piece that follows them
/// and every emitted chunk is whitespace-trimmed.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    /// Maximum characters per chunk
    chunk_size: usize,

    /// Maximum characters shared with the previous chunk
    chunk_overlap: usize,

    separators: Vec<String>,
}

impl TextSplitter {
    /// Create a new splitter with the default separators.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is 0 or if `chunk_overlap >= chunk_size`.
    /// Configuration validation rejects both before a splitter is built.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        assert!(
            chunk_overlap < chunk_size,
            "chunk_overlap must be < chunk_size"
        );

        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Get the chunk size in characters.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Get the overlap in characters.
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split a sequence of documents into chunks.
    ///
    /// Document order is preserved, and chunks of one document keep
    /// their left-to-right order. Each chunk carries a copy of its
    /// document's metadata; `id` is left unset for the identifier.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for document in documents {
            for content in self.split_text(&document.content) {
                let mut metadata = document.metadata.clone();
                metadata.id = None;
                chunks.push(Chunk { content, metadata });
            }
        }

        chunks
    }

    /// Split raw text into chunks.
    ///
    /// Empty or whitespace-only text yields no chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // "" always matches; anything after the chosen separator is a fallback
        let mut separator = "";
        let mut fallbacks: &[String] = &[];
        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                fallbacks = &separators[i + 1..];
                break;
            }
        }

        let mut output = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in split_keep_start(text, separator) {
            if char_len(&piece) < self.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                output.extend(self.merge_pieces(&good));
                good.clear();
            }

            if fallbacks.is_empty() {
                if !piece.trim().is_empty() {
                    output.push(piece);
                }
            } else {
                output.extend(self.split_recursive(&piece, fallbacks));
            }
        }

        if !good.is_empty() {
            output.extend(self.merge_pieces(&good));
        }

        output
    }

    /// Merge small pieces into windows of at most `chunk_size` chars.
    fn merge_pieces(&self, pieces: &[String]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {}, which is longer than the specified {}",
                        total,
                        self.chunk_size
                    );
                }

                if !window.is_empty() {
                    if let Some(chunk) = join_window(&window) {
                        chunks.push(chunk);
                    }

                    // Keep a tail of at most chunk_overlap chars that
                    // still leaves room for the incoming piece
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match window.pop_front() {
                            Some((_, front_len)) => total -= front_len,
                            None => break,
                        }
                    }
                }
            }

            window.push_back((piece.as_str(), len));
            total += len;
        }

        if let Some(chunk) = join_window(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(800, 70)
    }
}

/// Split on `separator`, attaching each occurrence to the following piece.
///
/// `""` splits into individual characters. Empty pieces are dropped.
fn split_keep_start(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(|c| c.to_string()).collect();
    }

    let mut parts = text.split(separator);
    let mut pieces = Vec::new();

    if let Some(first) = parts.next() {
        if !first.is_empty() {
            pieces.push(first.to_string());
        }
    }
    for part in parts {
        pieces.push(format!("{separator}{part}"));
    }

    pieces
}

fn join_window(window: &VecDeque<(&str, usize)>) -> Option<String> {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
