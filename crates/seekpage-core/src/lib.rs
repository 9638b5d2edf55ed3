//! Keyset (seek) pagination and dynamic query composition.
//!
//! Pages through large filtered, sorted result sets by seeking past the
//! last row seen instead of skipping an offset, while composing joins,
//! predicates and group-bys from independent [`filter::Filter`]s.
//!
//! ## Pipeline
//!
//! ```text
//! PageQuery ──► PageRequest ──► Paginator::set_request ──► PageState
//!                                        │
//!   MultiFilter ◄── Filter, Filter, ...  │
//!        │                               ▼
//!        └──────────────► pivot() ──► retrieve() ──► count_total()
//! ```
//!
//! The engine is synchronous and store-agnostic: anything implementing
//! [`Database`] can back it.

pub mod database;
pub mod error;
pub mod expand;
pub mod filter;
pub mod paginator;
pub mod projection;
pub mod request;
pub mod response;
pub mod value;

// Re-exports
pub use database::Database;
pub use error::{DestinationError, PaginationError, PaginationResult, QueryOperation, StoreError};
pub use expand::{expand_args, ExpandError};
pub use filter::{Combinator, Filter, Fragment, MultiFilter};
pub use paginator::Paginator;
pub use projection::{resolve_columns, Destination, Field, Record, Source, TABLE_ALIAS};
pub use request::{Cursor, PageQuery, PageRequest, PageState, RequestStateError, SortDirection};
pub use response::PaginatedResponse;
pub use seekpage_config::{ConfigError, PaginationConfig};
pub use value::{FromValue, Row, RowError, Value};
