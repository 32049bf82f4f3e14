//! Error types for the schema model and DDL compiler.

use strata_core::Dialect;

/// Errors raised while validating or compiling a table schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A schema part references a column that is not declared.
    #[error("Table '{table}' references unknown column '{column}'")]
    UnknownColumn {
        /// Table carrying the reference.
        table: String,
        /// The undeclared column name.
        column: String,
    },

    /// An index declares an array position outside its column list.
    #[error("Index on table '{table}' has array position {position} out of range")]
    InvalidIndex {
        /// Table carrying the index.
        table: String,
        /// The out-of-range position.
        position: usize,
    },

    /// A generated column also carries a default value.
    #[error("Column '{0}' is generated and cannot carry a default value")]
    GeneratedWithDefault(String),

    /// A per-dialect generated expression map has no entry for the target.
    #[error("Column '{column}' has no generated expression for dialect '{dialect}'")]
    MissingGeneratedExpression {
        /// The generated column.
        column: String,
        /// The dialect being compiled for.
        dialect: Dialect,
    },

    /// The schema has no source identifier to check freshness against.
    #[error("Schema for table '{0}' has no source identifier")]
    MissingSource(String),

    /// The schema has no stored etag and its identifier has no timestamp.
    #[error("Schema for table '{0}' has no stored etag")]
    MissingEtag(String),

    /// IO error while reading the source definition.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
