//! The store capability the paginator consumes

use crate::value::{Row, Value};
use std::sync::Arc;

/// Minimal synchronous database access.
///
/// Queries use `?` positional placeholders, one per argument. List
/// arguments have already been expanded by the time a query arrives here.
/// Timeouts, isolation and pooling belong to the implementation.
pub trait Database {
    type Error: std::error::Error + Send + Sync + 'static;

    /// First row of the result, or `None` when the query matched nothing
    fn get(&self, sql: &str, args: &[Value]) -> Result<Option<Row>, Self::Error>;

    /// Every row of the result, in order
    fn select(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, Self::Error>;
}

impl<D: Database + ?Sized> Database for &D {
    type Error = D::Error;

    fn get(&self, sql: &str, args: &[Value]) -> Result<Option<Row>, Self::Error> {
        (**self).get(sql, args)
    }

    fn select(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, Self::Error> {
        (**self).select(sql, args)
    }
}

impl<D: Database + ?Sized> Database for Arc<D> {
    type Error = D::Error;

    fn get(&self, sql: &str, args: &[Value]) -> Result<Option<Row>, Self::Error> {
        (**self).get(sql, args)
    }

    fn select(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, Self::Error> {
        (**self).select(sql, args)
    }
}
