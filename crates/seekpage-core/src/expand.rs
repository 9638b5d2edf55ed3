//! Positional argument expansion.
//!
//! Filters may bind a [`Value::List`] to a single `?`, as in
//! `t.state IN (?)`. Before the query reaches the store every such
//! placeholder is rewritten into one placeholder per element and the
//! argument list is flattened to match. Arguments never become SQL text.

use crate::value::Value;
use thiserror::Error;

/// Errors building the final placeholder layout
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("query has {placeholders} placeholders but {args} arguments were supplied")]
    ArgumentCount { placeholders: usize, args: usize },

    #[error("argument {index} is an empty list")]
    EmptyList { index: usize },

    #[error("argument {index} is a list nested inside a list")]
    NestedList { index: usize },

    #[error("unterminated {0} in query")]
    Unterminated(&'static str),
}

/// Byte offsets of every `?` placeholder outside literals and comments
fn placeholder_offsets(sql: &str) -> Result<Vec<usize>, ExpandError> {
    let bytes = sql.as_bytes();
    let mut offsets = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'?' => {
                offsets.push(i);
                i += 1;
            }
            quote @ (b'\'' | b'"' | b'`') => {
                // A doubled quote inside the literal is an escaped quote
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => {
                            return Err(ExpandError::Unterminated(if quote == b'\'' {
                                "string literal"
                            } else {
                                "quoted identifier"
                            }))
                        }
                        Some(&b) if b == quote => {
                            if bytes.get(i + 1) == Some(&quote) {
                                i += 2;
                            } else {
                                i += 1;
                                break;
                            }
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                match sql[i + 2..].find("*/") {
                    Some(end) => i += 2 + end + 2,
                    None => return Err(ExpandError::Unterminated("block comment")),
                }
            }
            _ => i += 1,
        }
    }

    Ok(offsets)
}

/// Expand list arguments into multi-placeholder groups.
///
/// Returns the rewritten query and the flattened arguments. Queries with
/// no list arguments come back unchanged, but the placeholder count is
/// still checked against the argument count.
pub fn expand_args(sql: &str, args: Vec<Value>) -> Result<(String, Vec<Value>), ExpandError> {
    let offsets = placeholder_offsets(sql)?;
    if offsets.len() != args.len() {
        return Err(ExpandError::ArgumentCount {
            placeholders: offsets.len(),
            args: args.len(),
        });
    }

    if !args.iter().any(|a| matches!(a, Value::List(_))) {
        return Ok((sql.to_string(), args));
    }

    let mut out = String::with_capacity(sql.len() + args.len() * 3);
    let mut flat = Vec::with_capacity(args.len());
    let mut last = 0;

    for (index, (offset, arg)) in offsets.into_iter().zip(args).enumerate() {
        out.push_str(&sql[last..offset]);
        last = offset + 1;

        match arg {
            Value::List(items) => {
                if items.is_empty() {
                    return Err(ExpandError::EmptyList { index });
                }
                if items.iter().any(|v| matches!(v, Value::List(_))) {
                    return Err(ExpandError::NestedList { index });
                }
                for n in 0..items.len() {
                    if n > 0 {
                        out.push_str(", ");
                    }
                    out.push('?');
                }
                flat.extend(items);
            }
            scalar => {
                out.push('?');
                flat.push(scalar);
            }
        }
    }
    out.push_str(&sql[last..]);

    Ok((out, flat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_pass_through() {
        let (sql, args) =
            expand_args("SELECT * FROM t WHERE a = ? AND b = ?", vec![1.into(), "x".into()])
                .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = ? AND b = ?");
        assert_eq!(args, vec![Value::Integer(1), Value::from("x")]);
    }

    #[test]
    fn test_list_expands_in_place() {
        let (sql, args) = expand_args(
            "WHERE a = ? AND s IN (?) AND b = ?",
            vec![1.into(), Value::list(["ok", "failed", "skipped"]), 2.into()],
        )
        .unwrap();
        assert_eq!(sql, "WHERE a = ? AND s IN (?, ?, ?) AND b = ?");
        assert_eq!(
            args,
            vec![
                Value::Integer(1),
                Value::from("ok"),
                Value::from("failed"),
                Value::from("skipped"),
                Value::Integer(2),
            ]
        );
    }

    #[test]
    fn test_single_element_list() {
        let (sql, args) = expand_args("s IN (?)", vec![Value::list([5])]).unwrap();
        assert_eq!(sql, "s IN (?)");
        assert_eq!(args, vec![Value::Integer(5)]);
    }

    #[test]
    fn test_placeholders_in_literals_ignored() {
        let sql = "SELECT '?', \"a?\" FROM t -- why?\nWHERE x = ? /* ? */";
        let (out, args) = expand_args(sql, vec![Value::list([1, 2])]).unwrap();
        assert_eq!(out, "SELECT '?', \"a?\" FROM t -- why?\nWHERE x = ?, ? /* ? */");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn test_escaped_quote_in_literal() {
        let (_, args) = expand_args("WHERE a = 'it''s ?' AND b = ?", vec![1.into()]).unwrap();
        assert_eq!(args, vec![Value::Integer(1)]);
    }

    #[test]
    fn test_count_mismatch() {
        assert_eq!(
            expand_args("a = ? AND b = ?", vec![1.into()]),
            Err(ExpandError::ArgumentCount {
                placeholders: 2,
                args: 1
            })
        );
    }

    #[test]
    fn test_empty_list_rejected() {
        assert_eq!(
            expand_args("a = ? AND s IN (?)", vec![1.into(), Value::List(vec![])]),
            Err(ExpandError::EmptyList { index: 1 })
        );
    }

    #[test]
    fn test_nested_list_rejected() {
        assert_eq!(
            expand_args("s IN (?)", vec![Value::List(vec![Value::list([1])])]),
            Err(ExpandError::NestedList { index: 0 })
        );
    }

    #[test]
    fn test_unterminated_literal() {
        assert_eq!(
            expand_args("a = 'oops", vec![]),
            Err(ExpandError::Unterminated("string literal"))
        );
    }
}
