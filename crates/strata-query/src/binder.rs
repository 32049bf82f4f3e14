//! Named and positional parameter binding.
//!
//! SQL templates reference parameters as `:name`; [`bind_named`] rewrites
//! them to `?` placeholders and assembles the argument list in occurrence
//! order. PostgreSQL drivers take `$1..$n` instead of `?`, handled by
//! [`renumber_positional`] as a final pass.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use strata_core::SqlValue;

use crate::error::{QueryError, Result};

/// How [`bind_named`] treats parameters missing from the argument map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindMode {
    /// Missing parameters are an error.
    #[default]
    Strict,
    /// Missing parameters bind NULL.
    Permissive,
}

/// Named arguments for a SQL template.
pub type BindArgs = HashMap<String, SqlValue>;

// Also matches `::` so PostgreSQL cast syntax can be passed through.
fn named_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"::?[A-Za-z_][A-Za-z0-9_]*").expect("named parameter pattern is valid")
    })
}

/// Rewrites `:name` tokens to positional placeholders.
///
/// Each occurrence becomes one `?` — or, for a [`SqlValue::List`] of length
/// N, N comma-joined `?`s — and the bound value is appended to the returned
/// argument list. Repeated occurrences of one name re-emit its value.
/// `::type` casts are left untouched.
pub fn bind_named(
    sql: &str,
    args: &BindArgs,
    mode: BindMode,
) -> Result<(String, Vec<SqlValue>)> {
    let mut out = String::with_capacity(sql.len());
    let mut bound: Vec<SqlValue> = Vec::new();
    let mut last = 0;

    for found in named_param_pattern().find_iter(sql) {
        out.push_str(&sql[last..found.start()]);
        last = found.end();

        let token = found.as_str();
        if token.starts_with("::") {
            out.push_str(token);
            continue;
        }
        let name = &token[1..];

        match args.get(name) {
            Some(SqlValue::List(items)) => {
                if items.is_empty() {
                    return Err(QueryError::EmptyParameterList(String::from(name)));
                }
                let placeholders: Vec<&str> = items.iter().map(|_| "?").collect();
                out.push_str(&placeholders.join(", "));
                bound.extend(items.iter().cloned());
            }
            Some(value) => {
                out.push('?');
                bound.push(value.clone());
            }
            None => match mode {
                BindMode::Strict => {
                    return Err(QueryError::MissingParameter(String::from(name)));
                }
                BindMode::Permissive => {
                    out.push('?');
                    bound.push(SqlValue::Null);
                }
            },
        }
    }

    out.push_str(&sql[last..]);
    Ok((out, bound))
}

/// Renumbers `?` placeholders to `$1..$n` for PostgreSQL.
///
/// Also strips the literal `ORDER BY NULL` clause, a MySQL-family idiom for
/// "no ordering" that other engines reject.
#[must_use]
pub fn renumber_positional(sql: &str) -> String {
    let cleaned = sql.replace(" ORDER BY NULL", "");
    let mut out = String::with_capacity(cleaned.len());
    let mut position = 0_usize;
    for c in cleaned.chars() {
        if c == '?' {
            position += 1;
            out.push('$');
            out.push_str(&position.to_string());
        } else {
            out.push(c);
        }
    }
    out
}
