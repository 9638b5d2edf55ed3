//! Connection handle for the paginator's store.
//!
//! Every paginator operation is one prepared read, so a single connection
//! behind a mutex serves them; the lock is held for one statement and its
//! row mapping. Connection behaviour comes from [`StorageConfig`].

use crate::error::{SqliteError, SqliteResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use seekpage_config::{StorageConfig, MEMORY_PATH};
use std::sync::Arc;
use tracing::{debug, info};

/// SQLite database the paginator reads from.
///
/// Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
    config: StorageConfig,
}

impl SqliteDatabase {
    /// Open the database file named by `config.path`, or an in-memory
    /// database for `:memory:`, and apply the connection settings.
    pub fn new(config: StorageConfig) -> SqliteResult<Self> {
        info!(path = %config.path.display(), "Opening SQLite database");

        let conn = if config.path.to_str() == Some(MEMORY_PATH) {
            Connection::open_in_memory()?
        } else {
            if let Some(dir) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|e| {
                    SqliteError::Connection(format!("cannot create {}: {}", dir.display(), e))
                })?;
            }
            Connection::open(&config.path)?
        };

        let settings = pragmas(&config);
        debug!(pragmas = settings.len(), "Applying connection settings");
        conn.execute_batch(&settings.join("\n"))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            config,
        })
    }

    /// Fresh in-memory database
    pub fn memory() -> SqliteResult<Self> {
        Self::new(StorageConfig::memory())
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Run `f` while holding the connection
    pub fn with_connection<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&Connection) -> SqliteResult<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` with exclusive access, e.g. to open a transaction
    pub fn with_connection_mut<F, T>(&self, f: F) -> SqliteResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T>,
    {
        let mut conn = self.conn.lock();
        f(&mut conn)
    }

    /// Run one or more statements with no arguments, e.g. a schema
    pub fn execute_batch(&self, sql: &str) -> SqliteResult<()> {
        self.with_connection(|conn| Ok(conn.execute_batch(sql)?))
    }
}

/// PRAGMA statements for `config`.
///
/// Boolean settings are always stated, since the bundled SQLite does not
/// share the stock library's defaults.
fn pragmas(config: &StorageConfig) -> Vec<String> {
    let on_off = |flag: bool| if flag { "ON" } else { "OFF" };

    let mut out = Vec::with_capacity(7);
    if config.wal_mode {
        out.push("PRAGMA journal_mode = WAL;".to_string());
        out.push("PRAGMA synchronous = NORMAL;".to_string());
    }
    out.push(format!("PRAGMA foreign_keys = {};", on_off(config.foreign_keys)));
    out.push(format!("PRAGMA busy_timeout = {};", config.busy_timeout_ms));
    out.push(format!("PRAGMA cache_size = {};", config.cache_size));
    if config.mmap_size > 0 {
        out.push(format!("PRAGMA mmap_size = {};", config.mmap_size));
    }
    // Grouped counts build a temporary b-tree
    out.push("PRAGMA temp_store = MEMORY;".to_string());
    out
}
