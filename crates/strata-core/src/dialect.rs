//! Supported database dialects and their capability profiles.
//!
//! Every difference between the supported backends lives in one
//! [`DialectProfile`] row per dialect. The compilers look capabilities up
//! here instead of branching on the dialect, so adding a backend means
//! adding a row, not touching compiler logic. The few structural exceptions
//! (SQLite's lack of foreign keys and named checks, where index statements
//! may appear) are expressed as profile flags as well.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A supported SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// MySQL and compatible servers (MariaDB, Aurora MySQL).
    MySql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

/// How a dialect spells JSON/array membership tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainsKind {
    /// `? MEMBER OF (column)`.
    MemberOf,
    /// `JSONB_EXISTS(CAST(column AS JSONB), ?)`.
    JsonbExists,
    /// `column LIKE ?` with a wildcard-wrapped value; approximate.
    Like,
}

/// How a dialect provides full-text search over a column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullTextKind {
    /// `FULLTEXT INDEX` inside the table body, queried with `MATCH ... AGAINST`.
    InlineIndex,
    /// A GIN index over `TO_TSVECTOR`, queried with `@@ TO_TSQUERY`.
    TsVector,
    /// No full-text support; callers fall back to `LIKE`.
    Unsupported,
}

/// Capability and spelling table for one dialect.
///
/// All fields are fixed at compile time; [`Dialect::profile`] hands out a
/// `&'static` row and nothing mutates it at runtime.
#[derive(Debug)]
pub struct DialectProfile {
    /// Type name for boolean columns.
    pub boolean_type: &'static str,
    /// Type name for integer columns.
    pub integer_type: &'static str,
    /// Type name for floating-point columns.
    pub number_type: &'static str,
    /// Base type name for bounded text columns; a length clause is appended.
    pub text_type: &'static str,
    /// Type name for date/time columns.
    pub date_type: &'static str,
    /// Type name for JSON columns.
    pub json_type: &'static str,
    /// Largest length an inline text type accepts before promotion.
    pub max_inline_length: u32,
    /// Unbounded text type used once `max_inline_length` is exceeded.
    pub unbounded_text_type: &'static str,
    /// Auto-increment keyword appended to integer primary keys, if any.
    pub auto_increment: &'static str,
    /// Replacement type for auto-increment integer primary keys, if the
    /// dialect models auto-increment as a type rather than a keyword.
    pub serial_type: Option<&'static str>,
    /// Opening of a generated-column clause, up to the expression.
    pub generated_open: &'static str,
    /// Closing of a generated-column clause, after the expression.
    pub generated_close: &'static str,
    /// Whether `COMMENT '...'` is accepted on column definitions.
    pub supports_comments: bool,
    /// Whether `ON UPDATE CURRENT_TIMESTAMP` is accepted.
    pub supports_on_update_timestamp: bool,
    /// Whether CHECK constraints may carry a `CONSTRAINT <name>` prefix.
    pub supports_named_checks: bool,
    /// Whether a CHECK constraint may be declared `NOT ENFORCED`.
    pub supports_unenforced_checks: bool,
    /// Whether foreign key clauses are emitted at all.
    pub supports_foreign_keys: bool,
    /// Whether secondary indices live inside the table body
    /// (`INDEX <name> (...)`) instead of standalone `CREATE INDEX` statements.
    pub inline_indices: bool,
    /// Full-text strategy.
    pub fulltext: FullTextKind,
    /// Containment-test strategy.
    pub contains: ContainsKind,
    /// Element type used when indexing into a JSON array column.
    pub array_cast_type: &'static str,
    /// Whether the array cast carries a trailing `ARRAY` keyword.
    pub array_keyword: bool,
    /// Spelling of the regular-expression match operator.
    pub regex_operator: &'static str,
    /// Identifier quote character.
    pub quote: char,
}

static MYSQL: DialectProfile = DialectProfile {
    boolean_type: "BOOLEAN",
    integer_type: "INTEGER",
    number_type: "DOUBLE",
    text_type: "VARCHAR",
    date_type: "DATETIME",
    json_type: "JSON",
    max_inline_length: 16_383,
    unbounded_text_type: "LONGTEXT",
    auto_increment: "AUTO_INCREMENT",
    serial_type: None,
    generated_open: "AS (",
    generated_close: ")",
    supports_comments: true,
    supports_on_update_timestamp: true,
    supports_named_checks: true,
    supports_unenforced_checks: true,
    supports_foreign_keys: true,
    inline_indices: true,
    fulltext: FullTextKind::InlineIndex,
    contains: ContainsKind::MemberOf,
    array_cast_type: "CHAR(64)",
    array_keyword: true,
    regex_operator: "REGEXP",
    quote: '`',
};

static POSTGRES: DialectProfile = DialectProfile {
    boolean_type: "BOOLEAN",
    integer_type: "INTEGER",
    number_type: "DOUBLE PRECISION",
    text_type: "VARCHAR",
    date_type: "TIMESTAMP",
    json_type: "JSONB",
    max_inline_length: 10_485_760,
    unbounded_text_type: "TEXT",
    auto_increment: "",
    serial_type: Some("SERIAL"),
    generated_open: "GENERATED ALWAYS AS (",
    generated_close: ") STORED",
    supports_comments: false,
    supports_on_update_timestamp: false,
    supports_named_checks: true,
    supports_unenforced_checks: false,
    supports_foreign_keys: true,
    inline_indices: false,
    fulltext: FullTextKind::TsVector,
    contains: ContainsKind::JsonbExists,
    array_cast_type: "TEXT",
    array_keyword: false,
    regex_operator: "~*",
    quote: '"',
};

static SQLITE: DialectProfile = DialectProfile {
    boolean_type: "BOOLEAN",
    integer_type: "INTEGER",
    number_type: "DOUBLE",
    text_type: "VARCHAR",
    date_type: "DATETIME",
    json_type: "JSON",
    max_inline_length: u32::MAX,
    unbounded_text_type: "TEXT",
    auto_increment: "AUTOINCREMENT",
    serial_type: None,
    generated_open: "AS (",
    generated_close: ")",
    supports_comments: false,
    supports_on_update_timestamp: false,
    supports_named_checks: false,
    supports_unenforced_checks: false,
    supports_foreign_keys: false,
    inline_indices: false,
    fulltext: FullTextKind::Unsupported,
    contains: ContainsKind::Like,
    array_cast_type: "TEXT",
    array_keyword: false,
    regex_operator: "REGEXP",
    quote: '"',
};

impl Dialect {
    /// Returns the canonical dialect name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Returns the capability profile for this dialect.
    #[must_use]
    pub fn profile(self) -> &'static DialectProfile {
        match self {
            Self::MySql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::Sqlite => &SQLITE,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(CoreError::UnknownDialect(String::from(other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("mariadb".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("sqlite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
    }

    #[test]
    fn test_parse_unknown_name_fails() {
        let err = "oracle".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownDialect(name) if name == "oracle"));
    }

    #[test]
    fn test_profiles_differ_where_expected() {
        assert_eq!(Dialect::MySql.profile().date_type, "DATETIME");
        assert_eq!(Dialect::Postgres.profile().date_type, "TIMESTAMP");
        assert_eq!(Dialect::Postgres.profile().serial_type, Some("SERIAL"));
        assert!(Dialect::MySql.profile().inline_indices);
        assert!(!Dialect::Sqlite.profile().supports_foreign_keys);
        assert_eq!(Dialect::Postgres.profile().regex_operator, "~*");
    }

    #[test]
    fn test_sqlite_never_promotes_text() {
        assert_eq!(Dialect::Sqlite.profile().max_inline_length, u32::MAX);
    }

    #[test]
    fn test_display_round_trip() {
        for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
            assert_eq!(dialect.to_string().parse::<Dialect>().unwrap(), dialect);
        }
    }
}
