//! # Seekpage Configuration
//!
//! Configuration types for the seekpage workspace. Provides the pagination
//! limits threaded into the engine at construction time and the storage
//! settings used to open a database.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seekpage_config::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_file("seekpage.toml")?;
//! assert!(config.pagination.max_limit >= config.pagination.default_limit);
//! # Ok::<(), seekpage_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod loader;
mod pagination;
mod storage;

pub use error::{ConfigError, ConfigResult};
pub use loader::{Config, ConfigLoader, ENV_DATABASE_PATH};
pub use pagination::PaginationConfig;
pub use storage::{StorageConfig, MEMORY_PATH};
