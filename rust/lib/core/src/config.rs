use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ClientError;

/// Client configuration shared by the feed module and the CLI.
///
/// Read from `~/.coolfeed/config.toml` (or an explicit path). Every field
/// has a default, so a missing file is the same as an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Directory holding the local databases.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database file (block list).
    /// Defaults to `{data_dir}/data.redb` if not specified.
    pub db_path: Option<PathBuf>,

    /// Path to the SQLite database file (history, favorites, string caches).
    /// Defaults to `{data_dir}/data.sqlite` if not specified.
    pub sqlite_path: Option<PathBuf>,

    /// Record every opened feed into the browsing history.
    pub record_history: bool,

    /// Max characters of the feed message kept in a history/favorite row.
    pub history_message_limit: usize,

    /// Uid of the logged-in user; empty when logged out.
    pub uid: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_path: None,
            sqlite_path: None,
            record_history: true,
            history_message_limit: 150,
            uid: String::new(),
        }
    }
}

impl ClientConfig {
    /// Default config file path: ~/.coolfeed/config.toml.
    pub fn default_path() -> PathBuf {
        home_dir().join("config.toml")
    }

    /// Load config from disk, or return the default if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        if !path.exists() {
            debug!("config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| ClientError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Save config to disk, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Config(e.to_string()))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ClientError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Resolve the redb database path, falling back to `{data_dir}/data.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.redb"))
    }

    /// Resolve the SQLite database path, falling back to `{data_dir}/data.sqlite`.
    pub fn resolve_sqlite_path(&self) -> PathBuf {
        self.sqlite_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("data.sqlite"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| home_dir().join(name))
    }
}

fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".coolfeed")
}
