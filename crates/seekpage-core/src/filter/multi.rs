//! Ordered aggregation of filters

use super::{trim_combinator_prefix, Combinator, Filter, Fragment};
use crate::value::Value;

/// Folds any number of filters into one join / where / group fragment set.
///
/// Fragments are kept in add order. Each predicate is wrapped in
/// parentheses on their own lines and prefixed with its filter's combinator, so an `OR`
/// inside one filter never leaks into its neighbours. Group columns are
/// appended as given, duplicates included.
#[derive(Debug, Clone, Default)]
pub struct MultiFilter {
    join_sql: String,
    join_args: Vec<Value>,
    where_sql: String,
    where_args: Vec<Value>,
    group_cols: Vec<&'static str>,
    len: usize,
}

impl MultiFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a filter's capabilities into the aggregate
    pub fn add<F: Filter>(&mut self, filter: F) -> &mut Self {
        if let Some(join) = filter.join().filter(|j| !j.is_empty()) {
            self.join_sql.push_str(join.sql.trim());
            self.join_sql.push('\n');
            self.join_args.extend(join.args);
        }

        if let Some(predicate) = filter.predicate().filter(|p| !p.is_empty()) {
            // Own lines for the parens, so a trailing `--` comment stays inside
            self.where_sql.push_str(filter.combinator().as_sql());
            self.where_sql.push_str(" (\n");
            self.where_sql.push_str(predicate.sql.trim());
            self.where_sql.push_str("\n)\n");
            self.where_args.extend(predicate.args);
        }

        self.group_cols.extend(filter.group());
        self.len += 1;
        self
    }

    /// Builder form of [`add`](Self::add)
    pub fn with<F: Filter>(mut self, filter: F) -> Self {
        self.add(filter);
        self
    }

    /// Number of filters added
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Concatenated join clauses and their arguments
    pub fn join_clause(&self) -> (&str, &[Value]) {
        (self.join_sql.trim(), &self.join_args)
    }

    /// Concatenated predicates, each led by its combinator token
    pub fn where_clause(&self) -> (&str, &[Value]) {
        (self.where_sql.trim(), &self.where_args)
    }

    /// Group-by columns in add order
    pub fn group_columns(&self) -> &[&'static str] {
        &self.group_cols
    }
}

impl Filter for MultiFilter {
    fn predicate(&self) -> Option<Fragment> {
        let (sql, args) = self.where_clause();
        if sql.is_empty() {
            return None;
        }
        Some(Fragment::new(trim_combinator_prefix(sql), args.to_vec()))
    }

    fn join(&self) -> Option<Fragment> {
        let (sql, args) = self.join_clause();
        if sql.is_empty() {
            return None;
        }
        Some(Fragment::new(sql, args.to_vec()))
    }

    fn group(&self) -> Vec<&'static str> {
        self.group_cols.clone()
    }

    fn combinator(&self) -> Combinator {
        Combinator::And
    }
}
