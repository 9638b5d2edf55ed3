//! Column projection from static record metadata.
//!
//! Each [`Record`] type declares a table of [`Field`]s. The paginator turns
//! that table into the `SELECT` list of a page query:
//!
//! - `Field::column("host")` projects `t.host`
//! - `Field::qualified("r.name")` projects `r.name AS 'r.name'`
//! - `Field::expr("latest", "MAX(t.executed_at)")` projects `MAX(t.executed_at) AS 'latest'`
//! - `Field::skip("summary")` projects nothing
//!
//! Every projected column comes back under the field's declared name, so
//! [`Record::from_row`] reads cells by that name.

use crate::value::{Row, RowError};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

/// Alias of the paginated table in every generated query
pub const TABLE_ALIAS: &str = "t";

/// How a field maps onto the query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Plain column on the paginated table, or an already-qualified column
    Column,
    /// SQL expression projected under the field's name
    Expr(&'static str),
    /// Not loaded from the query
    Skip,
}

/// One entry in a record's field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub source: Source,
}

impl Field {
    pub const fn column(name: &'static str) -> Self {
        Self {
            name,
            source: Source::Column,
        }
    }

    /// Column from a joined table, e.g. `r.name`
    pub const fn qualified(name: &'static str) -> Self {
        Self::column(name)
    }

    pub const fn expr(name: &'static str, expression: &'static str) -> Self {
        Self {
            name,
            source: Source::Expr(expression),
        }
    }

    pub const fn skip(name: &'static str) -> Self {
        Self {
            name,
            source: Source::Skip,
        }
    }

    /// SELECT-list entry for this field, `None` when skipped
    pub fn projection(&self) -> Option<String> {
        match self.source {
            Source::Skip => None,
            Source::Expr(expression) => Some(format!("{} AS '{}'", expression, self.name)),
            Source::Column if self.name.contains('.') => {
                Some(format!("{} AS '{}'", self.name, self.name))
            }
            Source::Column => Some(format!("{}.{}", TABLE_ALIAS, self.name)),
        }
    }
}

/// A type the paginator can load rows into
pub trait Record: Sized {
    /// Static field table, in projection order
    const FIELDS: &'static [Field];

    /// Build a record from a row projected from [`FIELDS`](Self::FIELDS)
    fn from_row(row: &Row) -> Result<Self, RowError>;
}

/// Projected columns for `fields`, in declaration order
pub fn resolve_columns(fields: &[Field]) -> Vec<String> {
    fields.iter().filter_map(Field::projection).collect()
}

/// A growable ordered collection that receives records in query order
pub trait Destination {
    type Record: Record;

    fn push_record(&mut self, record: Self::Record);
}

impl<T: Record> Destination for Vec<T> {
    type Record = T;

    fn push_record(&mut self, record: T) {
        self.push(record);
    }
}

impl<T: Record> Destination for Vec<Rc<T>> {
    type Record = T;

    fn push_record(&mut self, record: T) {
        self.push(Rc::new(record));
    }
}

impl<T: Record> Destination for Vec<Arc<T>> {
    type Record = T;

    fn push_record(&mut self, record: T) {
        self.push(Arc::new(record));
    }
}

impl<T: Record> Destination for VecDeque<T> {
    type Record = T;

    fn push_record(&mut self, record: T) {
        self.push_back(record);
    }
}
