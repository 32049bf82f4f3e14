//! # strata-core
//!
//! Shared building blocks for the strata SQL compilers:
//!
//! - [`SqlValue`] — parameter values carried next to `?` placeholders,
//!   with a single escaping point for the rare inline-literal positions.
//! - [`Fragment`] — a small SQL text tree, so identifier quoting lives in
//!   one place instead of at every call site.
//! - [`Dialect`] / [`DialectProfile`] — the closed set of supported backends
//!   and one immutable capability row per backend.
//!
//! The crate is deliberately free of I/O and database drivers; everything
//! here is a pure value type.

pub mod dialect;
pub mod error;
pub mod fragment;
pub mod value;

pub use dialect::{ContainsKind, Dialect, DialectProfile, FullTextKind};
pub use error::{CoreError, Result};
pub use fragment::{coalesce_concat, Fragment};
pub use value::{quote_str, SqlValue, ToSqlValue};
