//! Pagination request state.
//!
//! Requests move through three shapes:
//!
//! 1. [`PageQuery`] - the raw `limit`, `last_val`, `last_id`, `sort_by`
//!    and `sort_dir` parameters as strings, as an HTTP layer receives them.
//! 2. [`PageRequest`] - parsed values, not yet checked against a table.
//! 3. [`PageState`] - validated against the sort allow-list and the limit
//!    configuration, with the SQL ordering tokens derived. Immutable.

use seekpage_config::PaginationConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Query parameter carrying the page size
pub const QUERY_LIMIT: &str = "limit";
/// Query parameter carrying the last sort value of the previous page
pub const QUERY_LAST_VAL: &str = "last_val";
/// Query parameter carrying the last identity value of the previous page
pub const QUERY_LAST_ID: &str = "last_id";
/// Query parameter naming the sort column
pub const QUERY_SORT_BY: &str = "sort_by";
/// Query parameter naming the sort direction
pub const QUERY_SORT_DIR: &str = "sort_dir";

/// Reasons a request is rejected before any query runs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestStateError {
    #[error("invalid limit {0:?}")]
    InvalidLimit(String),

    #[error("invalid sort {0:?}")]
    InvalidSort(String),

    #[error("invalid sort direction {0:?}")]
    InvalidSortDirection(String),

    #[error("malformed query string: {0}")]
    MalformedQuery(String),

    #[error("pagination request has not been set")]
    Unset,
}

/// Raw pagination parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub limit: Option<String>,
    pub last_val: Option<String>,
    pub last_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PageQuery {
    /// Decode the recognised parameters from a URL query string.
    ///
    /// Unknown keys are ignored and the last occurrence of a key wins.
    pub fn from_query_str(query: &str) -> Result<Self, RequestStateError> {
        let mut out = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key)?;
            let value = decode_component(value)?;

            let slot = match key.as_str() {
                QUERY_LIMIT => &mut out.limit,
                QUERY_LAST_VAL => &mut out.last_val,
                QUERY_LAST_ID => &mut out.last_id,
                QUERY_SORT_BY => &mut out.sort_by,
                QUERY_SORT_DIR => &mut out.sort_dir,
                _ => continue,
            };
            *slot = Some(value);
        }

        Ok(out)
    }

    /// Parse into a [`PageRequest`]. An empty limit counts as unset.
    pub fn into_request(self) -> Result<PageRequest, RequestStateError> {
        let limit = match self.limit.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|_| RequestStateError::InvalidLimit(raw.to_string()))?,
            ),
        };

        Ok(PageRequest {
            limit,
            cursor: Cursor::new(
                self.last_val.unwrap_or_default(),
                self.last_id.unwrap_or_default(),
            ),
            sort_by: self.sort_by.unwrap_or_default(),
            sort_dir: self.sort_dir.unwrap_or_default(),
            unbounded: false,
        })
    }
}

fn decode_component(raw: &str) -> Result<String, RequestStateError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RequestStateError::MalformedQuery(e.to_string()))
}

/// Position of the last row of the previous page.
///
/// Both parts are opaque strings; empty means "no cursor".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor {
    pub last_value: String,
    pub last_id: String,
}

impl Cursor {
    pub fn new(last_value: impl Into<String>, last_id: impl Into<String>) -> Self {
        Self {
            last_value: last_value.into(),
            last_id: last_id.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.last_value.is_empty() && self.last_id.is_empty()
    }
}

/// Parsed pagination request, not yet validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Requested page size; `None` uses the configured default
    pub limit: Option<i64>,
    pub cursor: Cursor,
    /// Requested sort column; empty sorts by the identity column
    pub sort_by: String,
    /// `asc`, `desc` or empty for ascending
    pub sort_dir: String,
    /// Retrieve every remaining row instead of one page
    pub unbounded: bool,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after the given cursor
    pub fn after(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn sort_by(mut self, column: impl Into<String>) -> Self {
        self.sort_by = column.into();
        self
    }

    pub fn sort_dir(mut self, direction: impl Into<String>) -> Self {
        self.sort_dir = direction.into();
        self
    }

    /// Drop the row cap: the retrieval returns every row after the pivot
    pub fn without_limit(mut self) -> Self {
        self.unbounded = true;
        self
    }
}

/// Sort direction and its SQL tokens
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc` case-insensitively; empty means ascending
    pub fn parse(raw: &str) -> Result<Self, RequestStateError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(RequestStateError::InvalidSortDirection(raw.to_string())),
        }
    }

    /// Comparison admitting rows after the pivot
    pub fn operator(&self) -> &'static str {
        match self {
            SortDirection::Asc => ">",
            SortDirection::Desc => "<",
        }
    }

    /// `ORDER BY` keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Validated, query-ready request state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    limit: Option<u32>,
    cursor: Cursor,
    sort_by: &'static str,
    direction: SortDirection,
}

impl PageState {
    /// Validate a request for a table whose identity column is `id_column`.
    ///
    /// `sort_columns` is the allow-list of sortable columns. The returned
    /// state refers to the allow-list entry, never to the caller's string.
    pub fn validate(
        request: PageRequest,
        id_column: &'static str,
        sort_columns: &[&'static str],
        config: &PaginationConfig,
    ) -> Result<Self, RequestStateError> {
        let sort_by = if request.sort_by.is_empty() {
            id_column
        } else {
            sort_columns
                .iter()
                .copied()
                .find(|c| *c == request.sort_by)
                .ok_or_else(|| {
                    debug!(sort_by = %request.sort_by, "Rejected sort column");
                    RequestStateError::InvalidSort(request.sort_by.clone())
                })?
        };

        let direction = SortDirection::parse(&request.sort_dir)?;

        let limit = if request.unbounded {
            None
        } else {
            Some(resolve_limit(request.limit, config)?)
        };

        Ok(Self {
            limit,
            cursor: request.cursor,
            sort_by,
            direction,
        })
    }

    /// Row cap, `None` when unbounded
    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn sort_by(&self) -> &'static str {
        self.sort_by
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Unset or zero gives the default; above the maximum is capped
pub fn resolve_limit(
    limit: Option<i64>,
    config: &PaginationConfig,
) -> Result<u32, RequestStateError> {
    match limit {
        None | Some(0) => Ok(config.default_limit),
        Some(n) if n < 0 => Err(RequestStateError::InvalidLimit(n.to_string())),
        Some(n) => Ok(u32::try_from(n)
            .unwrap_or(u32::MAX)
            .min(config.max_limit)),
    }
}
