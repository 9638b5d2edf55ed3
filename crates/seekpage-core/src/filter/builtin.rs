//! Filters shipped with the crate.
//!
//! Column names are `&'static str` throughout: they are written into the
//! query text, so they have to come from code.

use super::{Combinator, Filter, Fragment};
use crate::value::Value;

/// `column LIKE %needle%`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Like {
    column: &'static str,
    needle: String,
}

impl Like {
    pub fn new(column: &'static str, needle: impl Into<String>) -> Self {
        Self {
            column,
            needle: needle.into(),
        }
    }
}

impl Filter for Like {
    fn predicate(&self) -> Option<Fragment> {
        Some(Fragment::new(
            format!("{} LIKE ?", self.column),
            [Value::Text(format!("%{}%", self.needle))],
        ))
    }
}

/// `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Equals {
    column: &'static str,
    value: Value,
}

impl Equals {
    pub fn new(column: &'static str, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

impl Filter for Equals {
    fn predicate(&self) -> Option<Fragment> {
        Some(Fragment::new(
            format!("{} = ?", self.column),
            [self.value.clone()],
        ))
    }
}

/// Inclusive range on a column. Either bound may be open; with both open
/// the filter contributes no predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    column: &'static str,
    lower: Option<Value>,
    upper: Option<Value>,
}

impl Range {
    pub fn new<A, B>(column: &'static str, lower: Option<A>, upper: Option<B>) -> Self
    where
        A: Into<Value>,
        B: Into<Value>,
    {
        Self {
            column,
            lower: lower.map(Into::into),
            upper: upper.map(Into::into),
        }
    }

    pub fn between(column: &'static str, lower: impl Into<Value>, upper: impl Into<Value>) -> Self {
        Self::new(column, Some(lower), Some(upper))
    }

    pub fn at_least(column: &'static str, lower: impl Into<Value>) -> Self {
        Self::new(column, Some(lower), None::<Value>)
    }

    pub fn at_most(column: &'static str, upper: impl Into<Value>) -> Self {
        Self::new(column, None::<Value>, Some(upper))
    }
}

impl Filter for Range {
    fn predicate(&self) -> Option<Fragment> {
        match (&self.lower, &self.upper) {
            (Some(lower), Some(upper)) => Some(Fragment::new(
                format!("{} BETWEEN ? AND ?", self.column),
                [lower.clone(), upper.clone()],
            )),
            (Some(lower), None) => Some(Fragment::new(
                format!("{} >= ?", self.column),
                [lower.clone()],
            )),
            (None, Some(upper)) => Some(Fragment::new(
                format!("{} <= ?", self.column),
                [upper.clone()],
            )),
            (None, None) => None,
        }
    }
}

/// `column IN (...)`, bound as one list argument and expanded at build time
#[derive(Debug, Clone, PartialEq)]
pub struct InList {
    column: &'static str,
    values: Vec<Value>,
}

impl InList {
    pub fn new<I, T>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self {
            column,
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl Filter for InList {
    fn predicate(&self) -> Option<Fragment> {
        Some(Fragment::new(
            format!("{} IN (?)", self.column),
            [Value::List(self.values.clone())],
        ))
    }
}

/// Switches the wrapped filter's combinator to `OR`
#[derive(Debug, Clone, PartialEq)]
pub struct Or<F>(pub F);

impl<F: Filter> Filter for Or<F> {
    fn predicate(&self) -> Option<Fragment> {
        self.0.predicate()
    }

    fn join(&self) -> Option<Fragment> {
        self.0.join()
    }

    fn group(&self) -> Vec<&'static str> {
        self.0.group()
    }

    fn combinator(&self) -> Combinator {
        Combinator::Or
    }
}

/// Filter assembled from raw fragments.
///
/// ```
/// use seekpage_core::filter::SqlFilter;
///
/// let latest_per_host = SqlFilter::new()
///     .with_join("JOIN hosts h ON h.name = t.host AND h.retired = ?", [0.into()])
///     .group_by(["t.host"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFilter {
    predicate: Option<Fragment>,
    join: Option<Fragment>,
    group: Vec<&'static str>,
    combinator: Combinator,
}

impl SqlFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_predicate(mut self, sql: &'static str, args: impl IntoIterator<Item = Value>) -> Self {
        self.predicate = Some(Fragment::new(sql, args));
        self
    }

    pub fn with_join(mut self, sql: &'static str, args: impl IntoIterator<Item = Value>) -> Self {
        self.join = Some(Fragment::new(sql, args));
        self
    }

    pub fn group_by(mut self, columns: impl IntoIterator<Item = &'static str>) -> Self {
        self.group.extend(columns);
        self
    }

    pub fn or(mut self) -> Self {
        self.combinator = Combinator::Or;
        self
    }
}

impl Filter for SqlFilter {
    fn predicate(&self) -> Option<Fragment> {
        self.predicate.clone()
    }

    fn join(&self) -> Option<Fragment> {
        self.join.clone()
    }

    fn group(&self) -> Vec<&'static str> {
        self.group.clone()
    }

    fn combinator(&self) -> Combinator {
        self.combinator
    }
}
