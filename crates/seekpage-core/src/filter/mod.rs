//! Composable SQL filters.
//!
//! A [`Filter`] contributes fragments to the query the paginator builds: a
//! predicate for the `WHERE` clause, an optional join, optional `GROUP BY`
//! columns, and the combinator that links its predicate to the ones before
//! it. Every capability is optional; the defaults contribute nothing.
//!
//! Fragments are SQL text written by the filter's author. Identifiers in
//! them are concatenated into the query as-is, so filters are code and must
//! never be built from request input. Values always travel as positional
//! `?` arguments.

mod builtin;
mod multi;

pub use builtin::{Equals, InList, Like, Or, Range, SqlFilter};
pub use multi::MultiFilter;

use crate::value::Value;
use std::fmt;

/// How a predicate joins the predicates added before it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A piece of SQL plus the positional arguments its placeholders consume
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Fragment {
    pub fn new(sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            sql: sql.into(),
            args: args.into_iter().collect(),
        }
    }

    /// True when the fragment carries no SQL
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }
}

/// Capabilities a filter may expose to the paginator
pub trait Filter {
    /// Predicate for the `WHERE` clause
    fn predicate(&self) -> Option<Fragment> {
        None
    }

    /// Join clause(s) appended after `FROM <table> t`
    fn join(&self) -> Option<Fragment> {
        None
    }

    /// Columns for `GROUP BY`.
    ///
    /// Only group on columns the filter's own join or the base table
    /// provides.
    fn group(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Combinator placed in front of the predicate
    fn combinator(&self) -> Combinator {
        Combinator::And
    }
}

impl<F: Filter + ?Sized> Filter for &F {
    fn predicate(&self) -> Option<Fragment> {
        (**self).predicate()
    }

    fn join(&self) -> Option<Fragment> {
        (**self).join()
    }

    fn group(&self) -> Vec<&'static str> {
        (**self).group()
    }

    fn combinator(&self) -> Combinator {
        (**self).combinator()
    }
}

impl<F: Filter + ?Sized> Filter for Box<F> {
    fn predicate(&self) -> Option<Fragment> {
        (**self).predicate()
    }

    fn join(&self) -> Option<Fragment> {
        (**self).join()
    }

    fn group(&self) -> Vec<&'static str> {
        (**self).group()
    }

    fn combinator(&self) -> Combinator {
        (**self).combinator()
    }
}

/// Strip a leading `AND`/`OR` token from an aggregated predicate
pub(crate) fn trim_combinator_prefix(sql: &str) -> &str {
    let trimmed = sql.trim_start();
    for token in ["AND", "OR"] {
        if let Some(rest) = trimmed.strip_prefix(token) {
            if rest.starts_with(char::is_whitespace) || rest.starts_with('(') {
                return rest.trim();
            }
        }
    }
    trimmed.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCapabilities;

    impl Filter for NoCapabilities {}

    #[test]
    fn test_default_capabilities_are_empty() {
        let f = NoCapabilities;
        assert!(f.predicate().is_none());
        assert!(f.join().is_none());
        assert!(f.group().is_empty());
        assert_eq!(f.combinator(), Combinator::And);
    }

    #[test]
    fn test_trim_combinator_prefix() {
        assert_eq!(trim_combinator_prefix("AND (a = ?)\nOR (b = ?)"), "(a = ?)\nOR (b = ?)");
        assert_eq!(trim_combinator_prefix("OR (a = ?)"), "(a = ?)");
        assert_eq!(trim_combinator_prefix("ANDROID = ?"), "ANDROID = ?");
        assert_eq!(trim_combinator_prefix("  a = ?  "), "a = ?");
    }
}
