//! # strata-schema
//!
//! Dialect-independent table schemas, the DDL compiler that renders them for
//! MySQL-family, PostgreSQL and SQLite backends, and the freshness protocol
//! deciding when a generated schema must be rebuilt from its source
//! definition.
//!
//! # Example
//!
//! ```
//! use strata_core::Dialect;
//! use strata_schema::prelude::*;
//!
//! let users = TableSchema::new("users")
//!     .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
//!     .column(ColumnSchema::new("email", ColumnType::Text).max_length(128).unique())
//!     .require("email");
//!
//! let sql = compile_create_table(&users, Dialect::Sqlite, None).unwrap();
//! assert!(sql.starts_with("CREATE TABLE users ("));
//! ```
//!
//! Compilation is pure: the same schema and dialect always yield
//! byte-identical SQL, and an invalid schema fails before any output is
//! produced. Expression-valued schema fields (generated columns, checks,
//! SQL defaults) are emitted verbatim and therefore trusted input.

pub mod ddl;
pub mod error;
pub mod freshness;
pub mod schema;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::ddl::compile_create_table;
    pub use crate::error::{Result, SchemaError};
    pub use crate::freshness::{content_etag, is_outdated, stamp};
    pub use crate::schema::{
        CheckConstraint, ColumnSchema, ColumnType, DateOn, DefaultValue, GeneratedExpr,
        IndexSchema, ReferentialAction, RelationKind, RelationSchema, TableSchema,
    };
}

pub use ddl::compile_create_table;
pub use error::{Result, SchemaError};
pub use freshness::is_outdated;
pub use schema::{
    CheckConstraint, ColumnSchema, ColumnType, DateOn, DefaultValue, GeneratedExpr, IndexSchema,
    ReferentialAction, RelationKind, RelationSchema, TableSchema,
};
