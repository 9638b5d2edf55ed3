//! Storage configuration
//!
//! Settings for opening the SQLite database backing the paginator.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Path value that selects an in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file, or `:memory:`
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Enable write-ahead logging
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Enforce foreign key constraints
    #[serde(default = "default_true")]
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
    /// SQLite page cache size (negative values are KiB)
    #[serde(default = "default_cache_size")]
    pub cache_size: i64,
    /// Memory-mapped IO size in bytes, 0 disables
    #[serde(default)]
    pub mmap_size: u64,
}

fn default_path() -> PathBuf {
    PathBuf::from("./seekpage.db")
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout() -> u32 {
    5000
}

fn default_cache_size() -> i64 {
    -64_000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            wal_mode: true,
            foreign_keys: true,
            busy_timeout_ms: default_busy_timeout(),
            cache_size: default_cache_size(),
            mmap_size: 0,
        }
    }
}

impl StorageConfig {
    /// Config for a database file at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Config for an in-memory database
    pub fn memory() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            wal_mode: false,
            ..Self::default()
        }
    }

    /// Whether this config selects an in-memory database
    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }
}
