//! # strata-query
//!
//! WHERE-clause compilation and parameter binding for the strata compilers.
//!
//! [`Condition`] trees — built directly or parsed from their JSON wire shape
//! — compile into a parameterized SQL boolean expression plus an ordered
//! argument list, with dialect-specific spellings for full-text and
//! containment predicates. [`bind_named`] and [`renumber_positional`]
//! normalize parameter style before the statement reaches a driver adapter.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use strata_core::Dialect;
//! use strata_query::{compile_where, Condition};
//!
//! let filter = Condition::from_value(&json!({"age": {"gte": 18}})).unwrap();
//! let (sql, args) = compile_where(&filter, Dialect::Postgres, &[]).unwrap();
//! assert_eq!(sql, "age >= ?");
//! assert_eq!(args.len(), 1);
//! ```
//!
//! Everything here is a pure function over immutable inputs; raw SQL escapes
//! (`$sql`, [`Condition::Raw`]) are emitted verbatim and therefore carry the
//! same trust requirements as hand-concatenated SQL.

pub mod binder;
pub mod condition;
pub mod error;

pub use binder::{bind_named, renumber_positional, BindArgs, BindMode};
pub use condition::{compile_where, Condition, Operator};
pub use error::{QueryError, Result};
