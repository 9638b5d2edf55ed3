//! [`Database`] implementation over rusqlite

use crate::connection::SqliteDatabase;
use crate::error::{SqliteError, SqliteResult};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Statement};
use seekpage_core::{Database, Row, Value};
use std::sync::Arc;
use tracing::trace;

/// Convert bound arguments. Lists must already be expanded.
fn bind_args(args: &[Value]) -> SqliteResult<Vec<SqlValue>> {
    args.iter()
        .enumerate()
        .map(|(index, arg)| match arg {
            Value::Null => Ok(SqlValue::Null),
            Value::Integer(i) => Ok(SqlValue::Integer(*i)),
            Value::Real(f) => Ok(SqlValue::Real(*f)),
            Value::Text(s) => Ok(SqlValue::Text(s.clone())),
            Value::Blob(b) => Ok(SqlValue::Blob(b.clone())),
            Value::List(_) => Err(SqliteError::Query(format!(
                "argument {} is an unexpanded list",
                index
            ))),
        })
        .collect()
}

fn column_names(stmt: &Statement<'_>) -> Arc<[String]> {
    stmt.column_names().into_iter().map(String::from).collect()
}

fn read_row(columns: &Arc<[String]>, row: &rusqlite::Row<'_>) -> SqliteResult<Row> {
    let values = (0..columns.len())
        .map(|i| {
            Ok(match row.get_ref(i)? {
                ValueRef::Null => Value::Null,
                ValueRef::Integer(i) => Value::Integer(i),
                ValueRef::Real(f) => Value::Real(f),
                ValueRef::Text(bytes) => Value::Text(
                    std::str::from_utf8(bytes)
                        .map_err(|e| SqliteError::Query(format!("column {}: {}", columns[i], e)))?
                        .to_string(),
                ),
                ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
            })
        })
        .collect::<SqliteResult<Vec<_>>>()?;

    Ok(Row::new(Arc::clone(columns), values))
}

impl Database for SqliteDatabase {
    type Error = SqliteError;

    fn get(&self, sql: &str, args: &[Value]) -> SqliteResult<Option<Row>> {
        let params = bind_args(args)?;
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let columns = column_names(&stmt);
            let mut rows = stmt.query(params_from_iter(params.iter()))?;

            match rows.next()? {
                Some(row) => Ok(Some(read_row(&columns, row)?)),
                None => Ok(None),
            }
        })
    }

    fn select(&self, sql: &str, args: &[Value]) -> SqliteResult<Vec<Row>> {
        let params = bind_args(args)?;
        self.with_connection(|conn| {
            let mut stmt = conn.prepare_cached(sql)?;
            let columns = column_names(&stmt);
            let mut rows = stmt.query(params_from_iter(params.iter()))?;

            let mut out = Vec::new();
            while let Some(row) = rows.next()? {
                out.push(read_row(&columns, row)?);
            }
            trace!(rows = out.len(), "Selected rows");
            Ok(out)
        })
    }
}
