//! SQLite backend for seekpage
//!
//! Implements [`seekpage_core::Database`] over a single rusqlite
//! connection so a [`seekpage_core::Paginator`] can page through SQLite
//! tables.
//!
//! ## Features
//!
//! - **WAL Mode**: Optimized for concurrent read access with write-ahead logging
//! - **Thread Safety**: Arc<Mutex<Connection>> pattern for concurrent access
//!
//! ## Usage
//!
//! ```rust,ignore
//! use seekpage_config::StorageConfig;
//! use seekpage_core::{PageRequest, Paginator};
//! use seekpage_sqlite::SqliteDatabase;
//!
//! let db = SqliteDatabase::new(StorageConfig::new("./reports.db"))?;
//! let mut pg = Paginator::unfiltered(&db, "reports", "id");
//! pg.set_request(PageRequest::new().limit(50), &["host"])?;
//! let page = pg.page::<Report>()?;
//! ```

pub mod connection;
pub mod database;
pub mod error;

// Re-exports
pub use connection::SqliteDatabase;
pub use error::{SqliteError, SqliteResult};
