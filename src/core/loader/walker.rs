//! File system walker with pattern-based filtering.
//!
//! Enumerates candidate files under a directory, filters them with
//! glob patterns and a size cap, and returns them in sorted order so
//! repeated ingestion runs see the same sequence. Walk errors
//! (permission denied, etc.) are logged and skipped.

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{RagError, Result};

/// File system walker with pattern-based filtering
#[derive(Debug, Clone)]
pub struct FileWalker {
    /// Patterns to include (e.g., "*.pdf")
    include_patterns: Vec<Pattern>,

    /// Patterns to exclude (e.g., "~$*" Office lock files)
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size in bytes (skip larger files)
    max_file_size_bytes: u64,

    /// Descend into subdirectories
    recursive: bool,
}

impl FileWalker {
    /// Create a new file walker
    ///
    /// # Arguments
    ///
    /// * `include_patterns` - Glob patterns for files to include
    /// * `exclude_patterns` - Glob patterns for files to exclude
    /// * `max_file_size_mb` - Maximum file size in megabytes
    ///
    /// # Returns
    ///
    /// A new `FileWalker` instance or an error if patterns are
    /// invalid
    pub fn new(
        include_patterns: &[&str],
        exclude_patterns: &[&str],
        max_file_size_mb: usize,
    ) -> Result<Self> {
        Ok(Self {
            include_patterns: compile(include_patterns, "include")?,
            exclude_patterns: compile(exclude_patterns, "exclude")?,
            max_file_size_bytes: (max_file_size_mb as u64) * 1024 * 1024,
            recursive: false,
        })
    }

    /// Walk subdirectories too (default: top level only)
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Collect all matching files from a directory, sorted by path
    ///
    /// # Errors
    ///
    /// Returns `InvalidPath` if `root` is not a directory.
    pub fn collect_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(RagError::InvalidPath(format!(
                "Not a directory: {}",
                root.display()
            )));
        }

        let mut walk = WalkDir::new(root).follow_links(false);
        if !self.recursive {
            walk = walk.max_depth(1);
        }

        let mut files = Vec::new();

        for entry in walk
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e, root))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }

                    let path = entry.path();

                    if !self.matches_patterns(path) {
                        continue;
                    }

                    if let Ok(metadata) = entry.metadata() {
                        if metadata.len() > self.max_file_size_bytes {
                            tracing::warn!(
                                "Skipping large file: {:?} ({} bytes)",
                                path,
                                metadata.len()
                            );
                            continue;
                        }
                    }

                    files.push(path.to_path_buf());
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Skip hidden directories, never the root itself
    fn should_process_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let path = entry.path();

        if path == root {
            return true;
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') && entry.file_type().is_dir() {
                return false;
            }
        }

        true
    }

    /// Check a file name against the include/exclude patterns
    fn matches_patterns(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|f| f.to_str()) else {
            return false;
        };

        let matches_include =
            self.include_patterns.is_empty() || self.include_patterns.iter().any(|p| p.matches(name));

        matches_include && !self.exclude_patterns.iter().any(|p| p.matches(name))
    }
}

fn compile(patterns: &[&str], kind: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p)
                .map_err(|e| RagError::ConfigError(format!("Invalid {kind} pattern '{p}': {e}")))
        })
        .collect()
}
