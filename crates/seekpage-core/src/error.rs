//! Pagination errors

use crate::expand::ExpandError;
use crate::request::RequestStateError;
use crate::value::RowError;
use seekpage_config::ConfigError;
use std::fmt;
use thiserror::Error;

/// Boxed store error, downcastable to the backend's own type
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The query a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOperation {
    PivotFirst,
    Pivot,
    Retrieve,
    Count,
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryOperation::PivotFirst => "pivot_first",
            QueryOperation::Pivot => "pivot",
            QueryOperation::Retrieve => "retrieve",
            QueryOperation::Count => "count",
        };
        f.write_str(name)
    }
}

/// Why rows could not be loaded into a destination
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DestinationError {
    #[error("record type declares no projectable fields")]
    NoColumns,

    #[error(transparent)]
    Row(#[from] RowError),
}

/// Pagination error type
#[derive(Error, Debug)]
pub enum PaginationError {
    /// Rejected before any query ran
    #[error("invalid pagination request: {0}")]
    InvalidRequestState(#[from] RequestStateError),

    /// Limits that admit no rows
    #[error("invalid pagination config: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The destination cannot receive the page
    #[error("cannot load rows into {record}: {source}")]
    Destination {
        record: &'static str,
        #[source]
        source: DestinationError,
    },

    /// The query matched no rows
    #[error("{0}: no rows found")]
    NotFound(QueryOperation),

    /// Argument expansion failed
    #[error("{operation} sql in: {source}")]
    QueryBuild {
        operation: QueryOperation,
        #[source]
        source: ExpandError,
    },

    /// The store failed
    #[error("{operation} select: {source}")]
    Store {
        operation: QueryOperation,
        #[source]
        source: StoreError,
    },
}

impl PaginationError {
    /// True for [`PaginationError::NotFound`]: render "empty", not "failed"
    pub fn is_not_found(&self) -> bool {
        matches!(self, PaginationError::NotFound(_))
    }

    /// Operation that failed, when the error came from a query
    pub fn operation(&self) -> Option<QueryOperation> {
        match self {
            PaginationError::NotFound(op)
            | PaginationError::QueryBuild { operation: op, .. }
            | PaginationError::Store { operation: op, .. } => Some(*op),
            PaginationError::Destination { .. } => Some(QueryOperation::Retrieve),
            PaginationError::InvalidRequestState(_) | PaginationError::InvalidConfig(_) => None,
        }
    }

    pub(crate) fn store<E>(operation: QueryOperation, source: E) -> Self
    where
        E: Into<StoreError>,
    {
        PaginationError::Store {
            operation,
            source: source.into(),
        }
    }
}

/// Result type for pagination operations
pub type PaginationResult<T> = Result<T, PaginationError>;
