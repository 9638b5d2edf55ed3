//! Keyset pagination engine.
//!
//! A [`Paginator`] is bound to one table, its identity column, and a
//! filter. After a request is set it can resolve the pivot for the next
//! page, retrieve that page, and count every row the filter admits.
//!
//! Pages are ordered by `(sort column, identity column)`. The identity
//! column must be unique and totally ordered; it breaks ties between rows
//! with equal sort values so consecutive pages neither skip nor repeat
//! rows.
//!
//! Only identifiers from code reach the query text: the table, the
//! identity column, the allow-listed sort column, record field tables and
//! filter fragments. Everything else is bound as a `?` argument.

use crate::database::Database;
use crate::error::{DestinationError, PaginationError, PaginationResult, QueryOperation};
use crate::expand::expand_args;
use crate::filter::{Filter, Fragment, MultiFilter};
use crate::projection::{resolve_columns, Destination, Record, TABLE_ALIAS};
use crate::request::{PageRequest, PageState, RequestStateError};
use crate::response::PaginatedResponse;
use crate::value::{Row, Value};
use seekpage_config::PaginationConfig;
use tracing::debug;

/// Filter fragments gathered once per query
struct Clauses {
    join: Option<Fragment>,
    predicate: Option<Fragment>,
    group: Vec<&'static str>,
}

impl Clauses {
    fn from_filter<F: Filter>(filter: &F) -> Self {
        Self {
            join: filter.join().filter(|j| !j.is_empty()),
            predicate: filter.predicate().filter(|p| !p.is_empty()),
            group: filter.group(),
        }
    }
}

/// SQL text and arguments built in lockstep, so arguments always follow
/// the textual order of their placeholders
#[derive(Default)]
struct Query {
    sql: String,
    args: Vec<Value>,
}

impl Query {
    fn line(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self.sql.push('\n');
        self
    }

    fn bind(&mut self, args: impl IntoIterator<Item = Value>) -> &mut Self {
        self.args.extend(args);
        self
    }
}

/// Keyset paginator over one table.
///
/// ```no_run
/// # use seekpage_core::{Database, Paginator, PageRequest, Record};
/// # use seekpage_core::filter::{Like, MultiFilter};
/// # fn run<D: Database, R: Record>(db: &D) -> seekpage_core::PaginationResult<()> {
/// let filters = MultiFilter::new().with(Like::new("t.host", "web"));
/// let mut pg = Paginator::new(db, "reports", "id", filters);
/// pg.set_request(PageRequest::new().limit(50), &["host", "executed_at"])?;
///
/// let pivot = pg.pivot()?;
/// let mut rows: Vec<R> = Vec::new();
/// pg.retrieve(&pivot, &mut rows)?;
/// let total = pg.count_total()?;
/// # Ok(())
/// # }
/// ```
pub struct Paginator<'db, D: ?Sized, F = MultiFilter> {
    db: &'db D,
    table: &'static str,
    id_column: &'static str,
    filter: F,
    config: PaginationConfig,
    state: Option<PageState>,
}

impl<'db, D: Database + ?Sized> Paginator<'db, D, MultiFilter> {
    /// Paginator with no filter
    pub fn unfiltered(db: &'db D, table: &'static str, id_column: &'static str) -> Self {
        Self::new(db, table, id_column, MultiFilter::new())
    }
}

impl<'db, D: Database + ?Sized, F: Filter> Paginator<'db, D, F> {
    pub fn new(db: &'db D, table: &'static str, id_column: &'static str, filter: F) -> Self {
        Self {
            db,
            table,
            id_column,
            filter,
            config: PaginationConfig::default(),
            state: None,
        }
    }

    /// Replace the default limits. Rejects limits that would make every
    /// page empty.
    pub fn with_config(mut self, config: PaginationConfig) -> PaginationResult<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Validate and bind a request. `sort_columns` is the allow-list of
    /// columns the caller may sort by.
    pub fn set_request(
        &mut self,
        request: PageRequest,
        sort_columns: &[&'static str],
    ) -> PaginationResult<()> {
        let state = PageState::validate(request, self.id_column, sort_columns, &self.config)?;
        debug!(
            table = self.table,
            sort_by = state.sort_by(),
            direction = %state.direction(),
            limit = ?state.limit(),
            "Pagination request bound"
        );
        self.state = Some(state);
        Ok(())
    }

    /// The bound request, if any
    pub fn state(&self) -> Option<&PageState> {
        self.state.as_ref()
    }

    fn bound_state(&self) -> PaginationResult<&PageState> {
        self.state
            .as_ref()
            .ok_or(PaginationError::InvalidRequestState(RequestStateError::Unset))
    }

    /// `FROM`, joins, the seek condition, the filter predicate and the group
    fn push_body(&self, query: &mut Query, clauses: &Clauses, seek: &str, seek_args: Vec<Value>) {
        query.line(&format!("FROM {} {}", self.table, TABLE_ALIAS));

        if let Some(join) = &clauses.join {
            query.line(join.sql.trim()).bind(join.args.iter().cloned());
        }

        query.line(&format!("WHERE {}", seek)).bind(seek_args);

        if let Some(predicate) = &clauses.predicate {
            query
                .line("AND (")
                .line(predicate.sql.trim())
                .line(")")
                .bind(predicate.args.iter().cloned());
        }

        if !clauses.group.is_empty() {
            query.line(&format!("GROUP BY {}", clauses.group.join(", ")));
        }
    }

    fn push_order(&self, query: &mut Query, state: &PageState) {
        query.line(&format!(
            "ORDER BY {a}.{sort} {dir}, {a}.{id} ASC",
            a = TABLE_ALIAS,
            sort = state.sort_by(),
            dir = state.direction().keyword(),
            id = self.id_column,
        ));
    }

    fn finish(&self, operation: QueryOperation, query: Query) -> PaginationResult<(String, Vec<Value>)> {
        let sql = query.sql.trim_end();
        let (sql, args) = expand_args(sql, query.args)
            .map_err(|source| PaginationError::QueryBuild { operation, source })?;
        debug!(
            operation = %operation,
            table = self.table,
            args = args.len(),
            "Executing pagination query"
        );
        Ok((sql, args))
    }

    fn fetch_pivot(&self, operation: QueryOperation, query: Query) -> PaginationResult<String> {
        let (sql, args) = self.finish(operation, query)?;
        let row = self
            .db
            .get(&sql, &args)
            .map_err(|e| PaginationError::store(operation, e))?
            .ok_or_else(|| {
                debug!(operation = %operation, table = self.table, "No pivot row");
                PaginationError::NotFound(operation)
            })?;

        row.value_at(0)
            .and_then(Value::to_cursor_string)
            .ok_or_else(|| {
                PaginationError::store(operation, "sort column value cannot be used as a pivot")
            })
    }

    /// Pivot for a request with no cursor: the sort value of the first row
    /// the filter admits, in the requested order.
    pub fn pivot_first(&self) -> PaginationResult<String> {
        let state = self.bound_state()?;
        let clauses = Clauses::from_filter(&self.filter);

        let mut query = Query::default();
        query.line(&format!("SELECT {}.{}", TABLE_ALIAS, state.sort_by()));
        self.push_body(&mut query, &clauses, "(1 = 1)", Vec::new());
        self.push_order(&mut query, state);
        query.line("LIMIT 1");

        self.fetch_pivot(QueryOperation::PivotFirst, query)
    }

    /// Pivot for the bound request.
    ///
    /// Without a cursor this is [`pivot_first`](Self::pivot_first). With
    /// one, the cursor's sort value is confirmed against a row the filter
    /// still admits, at or after the cursor's identity.
    pub fn pivot(&self) -> PaginationResult<String> {
        let state = self.bound_state()?;
        let cursor = state.cursor();
        if cursor.is_empty() {
            return self.pivot_first();
        }

        let clauses = Clauses::from_filter(&self.filter);
        let (seek, seek_args) = if cursor.last_id.is_empty() {
            (
                format!("({}.{} = ?)", TABLE_ALIAS, state.sort_by()),
                vec![Value::from(&cursor.last_value)],
            )
        } else {
            (
                format!(
                    "({a}.{sort} = ? AND {a}.{id} >= ?)",
                    a = TABLE_ALIAS,
                    sort = state.sort_by(),
                    id = self.id_column,
                ),
                vec![Value::from(&cursor.last_value), Value::from(&cursor.last_id)],
            )
        };

        let mut query = Query::default();
        query.line(&format!("SELECT {}.{}", TABLE_ALIAS, state.sort_by()));
        self.push_body(&mut query, &clauses, &seek, seek_args);
        query.line("LIMIT 1");

        self.fetch_pivot(QueryOperation::Pivot, query)
    }

    /// Load the page that starts at `pivot` into `dest`.
    ///
    /// Rows are admitted when their sort value is strictly past the pivot,
    /// or equal to it with an identity past the cursor's. Without a cursor
    /// identity every row equal to the pivot is admitted. Returns
    /// [`PaginationError::NotFound`] when the page is empty.
    pub fn retrieve<Dst: Destination>(&self, pivot: &str, dest: &mut Dst) -> PaginationResult<()> {
        let operation = QueryOperation::Retrieve;
        let state = self.bound_state()?;
        let record = std::any::type_name::<Dst::Record>();

        let columns = resolve_columns(<Dst::Record as Record>::FIELDS);
        if columns.is_empty() {
            return Err(PaginationError::Destination {
                record,
                source: DestinationError::NoColumns,
            });
        }

        let clauses = Clauses::from_filter(&self.filter);
        let last_id = &state.cursor().last_id;
        let (seek, seek_args) = if last_id.is_empty() {
            (
                format!(
                    "({a}.{sort} {op} ? OR {a}.{sort} = ?)",
                    a = TABLE_ALIAS,
                    sort = state.sort_by(),
                    op = state.direction().operator(),
                ),
                vec![Value::from(pivot), Value::from(pivot)],
            )
        } else {
            (
                format!(
                    "({a}.{sort} {op} ? OR ({a}.{sort} = ? AND {a}.{id} > ?))",
                    a = TABLE_ALIAS,
                    sort = state.sort_by(),
                    op = state.direction().operator(),
                    id = self.id_column,
                ),
                vec![Value::from(pivot), Value::from(pivot), Value::from(last_id)],
            )
        };

        let mut query = Query::default();
        query.line(&format!("SELECT {}", columns.join(", ")));
        self.push_body(&mut query, &clauses, &seek, seek_args);
        self.push_order(&mut query, state);
        if let Some(limit) = state.limit() {
            query.line("LIMIT ?").bind([Value::from(limit)]);
        }

        let (sql, args) = self.finish(operation, query)?;
        let rows = self
            .db
            .select(&sql, &args)
            .map_err(|e| PaginationError::store(operation, e))?;

        if rows.is_empty() {
            debug!(operation = %operation, table = self.table, "Empty page");
            return Err(PaginationError::NotFound(operation));
        }

        for row in &rows {
            let item = <Dst::Record as Record>::from_row(row).map_err(|e| {
                PaginationError::Destination {
                    record,
                    source: e.into(),
                }
            })?;
            dest.push_record(item);
        }

        Ok(())
    }

    /// Number of rows the filter admits, ignoring cursor and limit.
    ///
    /// With a group-by this is the number of groups, which is the number
    /// of rows a complete walk of the pages returns.
    pub fn count_total(&self) -> PaginationResult<i64> {
        let operation = QueryOperation::Count;
        let clauses = Clauses::from_filter(&self.filter);

        let mut query = Query::default();
        if clauses.group.is_empty() {
            query.line("SELECT COUNT(*)");
            self.push_body(&mut query, &clauses, "(1 = 1)", Vec::new());
        } else {
            query.line("SELECT COUNT(*)").line("FROM (").line("SELECT 1");
            self.push_body(&mut query, &clauses, "(1 = 1)", Vec::new());
            query.line(") grouped");
        }

        let (sql, args) = self.finish(operation, query)?;
        let row = self
            .db
            .get(&sql, &args)
            .map_err(|e| PaginationError::store(operation, e))?;

        count_from_row(row.as_ref())
            .ok_or_else(|| PaginationError::store(operation, "count query returned no integer"))
    }

    /// Resolve the pivot, retrieve the page and count the total.
    ///
    /// An empty result, from the pivot or the page, yields an empty item
    /// list rather than an error.
    pub fn page<T: Record>(&self) -> PaginationResult<PaginatedResponse<T>> {
        let mut items: Vec<T> = Vec::new();

        match self.pivot() {
            Ok(pivot) => match self.retrieve(&pivot, &mut items) {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            },
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let total = self.count_total()?;
        Ok(PaginatedResponse { items, total })
    }
}

fn count_from_row(row: Option<&Row>) -> Option<i64> {
    match row {
        None => Some(0),
        Some(row) => match row.value_at(0)? {
            Value::Integer(n) => Some(*n),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{InList, Like, Or, SqlFilter};
    use crate::projection::Field;
    use crate::request::Cursor;
    use crate::value::RowError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("mock store failure")]
    struct MockError;

    /// Records every query and replays canned results
    #[derive(Default)]
    struct RecordingDb {
        queries: RefCell<Vec<(String, Vec<Value>)>>,
        get_results: RefCell<VecDeque<Option<Row>>>,
        select_results: RefCell<VecDeque<Vec<Row>>>,
        fail: bool,
    }

    impl RecordingDb {
        fn with_get(self, row: Option<Row>) -> Self {
            self.get_results.borrow_mut().push_back(row);
            self
        }

        fn with_select(self, rows: Vec<Row>) -> Self {
            self.select_results.borrow_mut().push_back(rows);
            self
        }

        fn last(&self) -> (String, Vec<Value>) {
            self.queries.borrow().last().cloned().expect("no query recorded")
        }
    }

    impl Database for RecordingDb {
        type Error = MockError;

        fn get(&self, sql: &str, args: &[Value]) -> Result<Option<Row>, MockError> {
            self.queries.borrow_mut().push((sql.to_string(), args.to_vec()));
            if self.fail {
                return Err(MockError);
            }
            Ok(self.get_results.borrow_mut().pop_front().flatten())
        }

        fn select(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, MockError> {
            self.queries.borrow_mut().push((sql.to_string(), args.to_vec()));
            if self.fail {
                return Err(MockError);
            }
            Ok(self.select_results.borrow_mut().pop_front().unwrap_or_default())
        }
    }

    #[derive(Debug, PartialEq)]
    struct Report {
        id: i64,
        host: String,
    }

    impl Record for Report {
        const FIELDS: &'static [Field] = &[
            Field::column("id"),
            Field::column("host"),
            Field::skip("resources"),
        ];

        fn from_row(row: &Row) -> Result<Self, RowError> {
            Ok(Self {
                id: row.get("id")?,
                host: row.get("host")?,
            })
        }
    }

    struct Nothing;

    impl Record for Nothing {
        const FIELDS: &'static [Field] = &[Field::skip("a")];

        fn from_row(_row: &Row) -> Result<Self, RowError> {
            Ok(Nothing)
        }
    }

    const SORTS: &[&str] = &["host", "executed_at"];

    fn report_row(id: i64, host: &str) -> Row {
        Row::from_pairs([("id", Value::Integer(id)), ("host", Value::from(host))])
    }

    fn bound<'a>(db: &'a RecordingDb, request: PageRequest) -> Paginator<'a, RecordingDb> {
        let filters = MultiFilter::new().with(Like::new("t.host", "web"));
        let mut pg = Paginator::new(db, "reports", "id", filters);
        pg.set_request(request, SORTS).unwrap();
        pg
    }

    #[test]
    fn test_operations_require_request() {
        let db = RecordingDb::default();
        let pg = Paginator::unfiltered(&db, "reports", "id");

        assert!(matches!(
            pg.pivot(),
            Err(PaginationError::InvalidRequestState(RequestStateError::Unset))
        ));
        let mut out: Vec<Report> = Vec::new();
        assert!(matches!(
            pg.retrieve("1", &mut out),
            Err(PaginationError::InvalidRequestState(RequestStateError::Unset))
        ));
        assert!(db.queries.borrow().is_empty());
    }

    #[test]
    fn test_invalid_request_rejected_before_query() {
        let db = RecordingDb::default();
        let mut pg = Paginator::unfiltered(&db, "reports", "id");

        let err = pg
            .set_request(PageRequest::new().sort_by("secret"), SORTS)
            .unwrap_err();
        assert!(matches!(
            err,
            PaginationError::InvalidRequestState(RequestStateError::InvalidSort(_))
        ));
        assert!(pg.state().is_none());
        assert!(db.queries.borrow().is_empty());
    }

    #[test]
    fn test_pivot_first_sql() {
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("host", "web-01")])));
        let pg = bound(&db, PageRequest::new().sort_by("host").sort_dir("desc"));

        assert_eq!(pg.pivot().unwrap(), "web-01");
        let (sql, args) = db.last();
        assert_eq!(
            sql,
            "SELECT t.host\n\
             FROM reports t\n\
             WHERE (1 = 1)\n\
             AND (\n\
             (\n\
             t.host LIKE ?\n\
             )\n\
             )\n\
             ORDER BY t.host DESC, t.id ASC\n\
             LIMIT 1"
        );
        assert_eq!(args, vec![Value::from("%web%")]);
    }

    #[test]
    fn test_pivot_with_cursor_sql() {
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("id", 2)])));
        let pg = bound(&db, PageRequest::new().after(Cursor::new("2", "2")));

        assert_eq!(pg.pivot().unwrap(), "2");
        let (sql, args) = db.last();
        assert_eq!(
            sql,
            "SELECT t.id\n\
             FROM reports t\n\
             WHERE (t.id = ? AND t.id >= ?)\n\
             AND (\n\
             (\n\
             t.host LIKE ?\n\
             )\n\
             )\n\
             LIMIT 1"
        );
        assert_eq!(
            args,
            vec![Value::from("2"), Value::from("2"), Value::from("%web%")]
        );
    }

    #[test]
    fn test_pivot_not_found() {
        let db = RecordingDb::default().with_get(None);
        let pg = bound(&db, PageRequest::new());

        let err = pg.pivot().unwrap_err();
        assert!(matches!(
            err,
            PaginationError::NotFound(QueryOperation::PivotFirst)
        ));
    }

    #[test]
    fn test_null_pivot_is_store_error() {
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("host", Value::Null)])));
        let pg = bound(&db, PageRequest::new().sort_by("host"));

        assert!(matches!(
            pg.pivot(),
            Err(PaginationError::Store {
                operation: QueryOperation::PivotFirst,
                ..
            })
        ));
    }

    #[test]
    fn test_retrieve_sql_with_cursor() {
        let db = RecordingDb::default().with_select(vec![report_row(3, "web-03")]);
        let pg = bound(
            &db,
            PageRequest::new().limit(2).after(Cursor::new("2", "2")),
        );

        let mut out: Vec<Report> = Vec::new();
        pg.retrieve("2", &mut out).unwrap();
        assert_eq!(
            out,
            vec![Report {
                id: 3,
                host: "web-03".into()
            }]
        );

        let (sql, args) = db.last();
        assert_eq!(
            sql,
            "SELECT t.id, t.host\n\
             FROM reports t\n\
             WHERE (t.id > ? OR (t.id = ? AND t.id > ?))\n\
             AND (\n\
             (\n\
             t.host LIKE ?\n\
             )\n\
             )\n\
             ORDER BY t.id ASC, t.id ASC\n\
             LIMIT ?"
        );
        assert_eq!(
            args,
            vec![
                Value::from("2"),
                Value::from("2"),
                Value::from("2"),
                Value::from("%web%"),
                Value::Integer(2),
            ]
        );
    }

    #[test]
    fn test_retrieve_first_page_admits_pivot_ties() {
        let db = RecordingDb::default().with_select(vec![report_row(1, "a")]);
        let pg = bound(&db, PageRequest::new().sort_by("host").sort_dir("desc"));

        let mut out: Vec<Report> = Vec::new();
        pg.retrieve("web-09", &mut out).unwrap();

        let (sql, args) = db.last();
        assert!(sql.contains("WHERE (t.host < ? OR t.host = ?)\n"));
        assert!(sql.contains("ORDER BY t.host DESC, t.id ASC\nLIMIT ?"));
        assert_eq!(args.len(), 4);
    }

    #[test]
    fn test_retrieve_unbounded_has_no_limit() {
        let db = RecordingDb::default().with_select(vec![report_row(1, "a")]);
        let pg = bound(&db, PageRequest::new().without_limit());

        let mut out: Vec<Report> = Vec::new();
        pg.retrieve("1", &mut out).unwrap();

        let (sql, args) = db.last();
        assert!(!sql.contains("LIMIT"));
        assert_eq!(args.last(), Some(&Value::from("%web%")));
    }

    #[test]
    fn test_retrieve_empty_page_is_not_found() {
        let db = RecordingDb::default().with_select(Vec::new());
        let pg = bound(&db, PageRequest::new());

        let mut out: Vec<Report> = Vec::new();
        let err = pg.retrieve("1", &mut out).unwrap_err();
        assert!(matches!(err, PaginationError::NotFound(QueryOperation::Retrieve)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_retrieve_rejects_record_without_columns() {
        let db = RecordingDb::default();
        let pg = bound(&db, PageRequest::new());

        let mut out: Vec<Nothing> = Vec::new();
        let err = pg.retrieve("1", &mut out).unwrap_err();
        assert!(matches!(
            err,
            PaginationError::Destination {
                source: DestinationError::NoColumns,
                ..
            }
        ));
        assert!(db.queries.borrow().is_empty());
    }

    #[test]
    fn test_retrieve_row_mismatch_is_destination_error() {
        let db = RecordingDb::default().with_select(vec![Row::from_pairs([("id", "x"), ("host", "y")])]);
        let pg = bound(&db, PageRequest::new());

        let mut out: Vec<Report> = Vec::new();
        let err = pg.retrieve("1", &mut out).unwrap_err();
        assert!(matches!(
            err,
            PaginationError::Destination {
                source: DestinationError::Row(RowError::InvalidType { .. }),
                ..
            }
        ));
    }

    #[test]
    fn test_joins_and_list_args_in_textual_order() {
        let filters = MultiFilter::new()
            .with(SqlFilter::new().with_join(
                "JOIN environments e ON e.name = t.environment AND e.active = ?",
                [1.into()],
            ))
            .with(InList::new("t.state", ["changed", "failed"]))
            .with(Or(Like::new("t.host", "db")));
        let db = RecordingDb::default().with_select(vec![report_row(1, "a")]);
        let mut pg = Paginator::new(&db, "reports", "id", filters);
        pg.set_request(PageRequest::new().limit(10).after(Cursor::new("5", "5")), SORTS)
            .unwrap();

        let mut out: Vec<Report> = Vec::new();
        pg.retrieve("5", &mut out).unwrap();

        let (sql, args) = db.last();
        assert_eq!(
            sql,
            "SELECT t.id, t.host\n\
             FROM reports t\n\
             JOIN environments e ON e.name = t.environment AND e.active = ?\n\
             WHERE (t.id > ? OR (t.id = ? AND t.id > ?))\n\
             AND (\n\
             (\n\
             t.state IN (?, ?)\n\
             )\n\
             OR (\n\
             t.host LIKE ?\n\
             )\n\
             )\n\
             ORDER BY t.id ASC, t.id ASC\n\
             LIMIT ?"
        );
        assert_eq!(
            args,
            vec![
                Value::Integer(1),
                Value::from("5"),
                Value::from("5"),
                Value::from("5"),
                Value::from("changed"),
                Value::from("failed"),
                Value::from("%db%"),
                Value::Integer(10),
            ]
        );
    }

    #[test]
    fn test_empty_list_is_query_build_error() {
        let filters = MultiFilter::new().with(InList::new("t.state", Vec::<String>::new()));
        let db = RecordingDb::default();
        let pg = Paginator::new(&db, "reports", "id", filters);

        let err = pg.count_total().unwrap_err();
        assert!(matches!(
            err,
            PaginationError::QueryBuild {
                operation: QueryOperation::Count,
                source: crate::expand::ExpandError::EmptyList { index: 0 },
            }
        ));
        assert!(db.queries.borrow().is_empty());
    }

    #[test]
    fn test_count_sql_ignores_window() {
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("COUNT(*)", 12)])));
        let pg = bound(&db, PageRequest::new().limit(1).after(Cursor::new("9", "9")));

        assert_eq!(pg.count_total().unwrap(), 12);
        let (sql, args) = db.last();
        assert_eq!(
            sql,
            "SELECT COUNT(*)\n\
             FROM reports t\n\
             WHERE (1 = 1)\n\
             AND (\n\
             (\n\
             t.host LIKE ?\n\
             )\n\
             )"
        );
        assert_eq!(args, vec![Value::from("%web%")]);
    }

    #[test]
    fn test_count_with_group_counts_groups() {
        let filters = MultiFilter::new().with(SqlFilter::new().group_by(["t.host"]));
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("COUNT(*)", 3)])));
        let pg = Paginator::new(&db, "reports", "id", filters);

        assert_eq!(pg.count_total().unwrap(), 3);
        let (sql, _) = db.last();
        assert_eq!(
            sql,
            "SELECT COUNT(*)\n\
             FROM (\n\
             SELECT 1\n\
             FROM reports t\n\
             WHERE (1 = 1)\n\
             GROUP BY t.host\n\
             ) grouped"
        );
    }

    #[test]
    fn test_count_does_not_need_request() {
        let db = RecordingDb::default().with_get(Some(Row::from_pairs([("n", 0)])));
        let pg = Paginator::unfiltered(&db, "reports", "id");
        assert_eq!(pg.count_total().unwrap(), 0);
    }

    #[test]
    fn test_store_failure_names_operation() {
        let db = RecordingDb {
            fail: true,
            ..Default::default()
        };
        let pg = bound(&db, PageRequest::new());

        let err = pg.count_total().unwrap_err();
        assert_eq!(err.to_string(), "count select: mock store failure");
        let err = pg.pivot().unwrap_err();
        assert_eq!(err.operation(), Some(QueryOperation::PivotFirst));
    }

    #[test]
    fn test_page_maps_empty_pivot_to_empty_items() {
        let db = RecordingDb::default()
            .with_get(None)
            .with_get(Some(Row::from_pairs([("n", 0)])));
        let pg = bound(&db, PageRequest::new());

        let page: PaginatedResponse<Report> = pg.page().unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_page_collects_items_and_total() {
        let db = RecordingDb::default()
            .with_get(Some(Row::from_pairs([("id", 1)])))
            .with_select(vec![report_row(1, "web-01"), report_row(2, "web-02")])
            .with_get(Some(Row::from_pairs([("n", 5)])));
        let pg = bound(&db, PageRequest::new().limit(2));

        let page: PaginatedResponse<Report> = pg.page().unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(db.queries.borrow().len(), 3);
    }

    #[test]
    fn test_custom_config_limits() {
        let db = RecordingDb::default().with_select(vec![report_row(1, "a")]);
        let mut pg = Paginator::unfiltered(&db, "reports", "id")
            .with_config(PaginationConfig {
                default_limit: 7,
                max_limit: 9,
            })
            .unwrap();
        pg.set_request(PageRequest::new(), &[]).unwrap();
        assert_eq!(pg.state().and_then(PageState::limit), Some(7));

        pg.set_request(PageRequest::new().limit(100), &[]).unwrap();
        let mut out: Vec<Report> = Vec::new();
        pg.retrieve("1", &mut out).unwrap();
        assert_eq!(db.last().1.last(), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_unusable_config_is_rejected() {
        let db = RecordingDb::default();

        for (default_limit, max_limit) in [(0, 20_000), (100, 0), (10, 5)] {
            let result = Paginator::unfiltered(&db, "reports", "id").with_config(PaginationConfig {
                default_limit,
                max_limit,
            });
            assert!(matches!(
                result,
                Err(PaginationError::InvalidConfig(
                    seekpage_config::ConfigError::InvalidValue { .. }
                ))
            ));
        }
        assert!(db.queries.borrow().is_empty());
    }
}
