//! XDG Base Directory Support
//!
//! Resolves where ragchat keeps its configuration file and its
//! persistent vector store on Linux/Unix systems.

use std::env;
use std::fs;
use std::path::PathBuf;

/// XDG directory structure for ragchat
#[derive(Debug, Clone)]
pub struct XdgDirs {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl XdgDirs {
    /// Create new XDG directory structure with proper resolution order
    ///
    /// Priority order (highest to lowest):
    /// 1. Explicit RAGCHAT_* env vars
    /// 2. XDG_* environment variables
    /// 3. XDG defaults (~/.config, ~/.local/share)
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
            data_dir: Self::resolve_data_dir(),
        }
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(dir) = env::var("RAGCHAT_CONFIG_DIR") {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("ragchat");
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("ragchat")
    }

    fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = env::var("RAGCHAT_HOME") {
            return PathBuf::from(dir);
        }

        if let Ok(xdg) = env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("ragchat");
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".local")
            .join("share")
            .join("ragchat")
    }

    /// Get config file path
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Get vector store directory path
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    /// Create the store directory if it doesn't exist
    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.store_dir())
    }

    /// Log the resolved XDG paths
    pub fn log_paths(&self) {
        tracing::debug!("XDG directories resolved:");
        tracing::debug!("  Config file: {:?}", self.config_file());
        tracing::debug!("  Store: {:?}", self.store_dir());
    }
}

impl Default for XdgDirs {
    fn default() -> Self {
        Self::new()
    }
}
