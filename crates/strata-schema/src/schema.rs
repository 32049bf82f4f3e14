//! Schema representation types.
//!
//! These types describe the structure of one database table independently of
//! any dialect. They are immutable value objects: the DDL compiler consumes
//! them without modification, and the freshness tracker only reads the
//! `source`/`etag` fields recorded at generation time.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strata_core::{quote_str, Dialect};

use crate::error::{Result, SchemaError};

/// Abstract column types supported by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnType {
    /// Boolean.
    Boolean,
    /// Integer.
    Integer,
    /// Floating point.
    Number,
    /// Bounded text; `max_length` controls the physical type.
    Text,
    /// Date and time.
    Date,
    /// JSON object document.
    JsonObject,
    /// JSON array document.
    JsonArray,
}

/// Automatic timestamp semantics for a date column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateOn {
    /// Set to the current timestamp when the row is inserted.
    Insert,
    /// Set on insert and refreshed on every update, where the dialect
    /// supports an on-update clause; elsewhere the refresh is left to the
    /// application.
    Update,
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum DefaultValue {
    /// No default value.
    #[default]
    None,
    /// NULL default.
    Null,
    /// Boolean default.
    Bool(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    Text(String),
    /// JSON document default, rendered as a quoted literal in expression
    /// position.
    Json(serde_json::Value),
    /// Pre-quoted SQL fragment, passed through verbatim. Trusted input.
    Expression(String),
}

impl DefaultValue {
    /// Returns the SQL representation of this default value.
    #[must_use]
    pub fn to_sql(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Null => Some(String::from("NULL")),
            Self::Bool(b) => Some(String::from(if *b { "TRUE" } else { "FALSE" })),
            Self::Integer(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Text(s) => Some(quote_str(s)),
            // Parenthesized so the engine treats the literal as an
            // expression rather than a plain string.
            Self::Json(value) => Some(format!("({})", quote_str(&value.to_string()))),
            Self::Expression(expr) => Some(expr.clone()),
        }
    }

    /// Returns `true` when no default is set.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// A generated-column expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeneratedExpr {
    /// One dialect-neutral SQL expression.
    Single(String),
    /// One expression per dialect.
    PerDialect(HashMap<Dialect, String>),
}

impl GeneratedExpr {
    /// Returns the expression to compile for `dialect`, if any.
    #[must_use]
    pub fn for_dialect(&self, dialect: Dialect) -> Option<&str> {
        match self {
            Self::Single(expr) => Some(expr),
            Self::PerDialect(map) => map.get(&dialect).map(String::as_str),
        }
    }
}

/// Referential action for foreign keys (ON DELETE, ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReferentialAction {
    /// No action (error if the referenced row is deleted/updated).
    #[default]
    NoAction,
    /// Restrict (checked immediately).
    Restrict,
    /// Cascade the delete/update to referencing rows.
    Cascade,
    /// Set the referencing column to NULL.
    SetNull,
    /// Set the referencing column to its default value.
    SetDefault,
}

impl ReferentialAction {
    /// Returns the SQL representation of this action.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// Multiplicity of a relation. Informational only; the generated DDL does
/// not enforce multiplicity beyond the foreign key itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Many rows of this table reference one row of the target.
    ManyToOne,
    /// Rows are linked through an association table.
    ManyToMany,
}

/// A named relation to another table. The referenced column is always `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationSchema {
    /// Relation name; also names the generated constraint.
    pub name: String,
    /// Local column holding the reference.
    pub join: String,
    /// Referenced table.
    pub target: String,
    /// Multiplicity.
    pub kind: RelationKind,
    /// Action on delete of the referenced row.
    pub on_delete: Option<ReferentialAction>,
    /// Action on update of the referenced key.
    pub on_update: Option<ReferentialAction>,
}

impl RelationSchema {
    /// Creates a many-to-one relation.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        join: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            join: join.into(),
            target: target.into(),
            kind: RelationKind::ManyToOne,
            on_delete: None,
            on_update: None,
        }
    }

    /// Marks the relation as many-to-many.
    #[must_use]
    pub fn many_to_many(mut self) -> Self {
        self.kind = RelationKind::ManyToMany;
        self
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Schema definition for an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSchema {
    /// Columns included in the index, in order.
    pub columns: Vec<String>,
    /// 0-based position within `columns` of a JSON-array member, indexed
    /// through a cast of its contents.
    pub array: Option<usize>,
    /// Whether this is a unique index.
    pub unique: bool,
}

impl IndexSchema {
    /// Creates an index over the given columns.
    #[must_use]
    pub fn new(columns: Vec<&str>) -> Self {
        Self {
            columns: columns.into_iter().map(String::from).collect(),
            array: None,
            unique: false,
        }
    }

    /// Marks the column at `position` as a JSON-array member.
    #[must_use]
    pub fn array(mut self, position: usize) -> Self {
        self.array = Some(position);
        self
    }

    /// Makes the index unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A table-level CHECK constraint.
///
/// The expression is emitted verbatim; it is trusted input, equivalent to
/// string-concatenated SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConstraint {
    /// Constraint name, if any. Dropped on dialects without named checks.
    pub name: Option<String>,
    /// Boolean SQL expression.
    pub check: String,
    /// Whether the constraint is enforced.
    pub enforced: bool,
    /// Restricts the constraint to one dialect; `None` applies everywhere.
    pub provider: Option<Dialect>,
}

impl CheckConstraint {
    /// Creates an unnamed constraint from a bare expression.
    #[must_use]
    pub fn expr(check: impl Into<String>) -> Self {
        Self {
            name: None,
            check: check.into(),
            enforced: true,
            provider: None,
        }
    }

    /// Creates a named constraint.
    #[must_use]
    pub fn named(name: impl Into<String>, check: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            check: check.into(),
            enforced: true,
            provider: None,
        }
    }

    /// Marks the constraint as declared but not enforced.
    #[must_use]
    pub fn not_enforced(mut self) -> Self {
        self.enforced = false;
        self
    }

    /// Restricts the constraint to a single dialect.
    #[must_use]
    pub fn provider(mut self, dialect: Dialect) -> Self {
        self.provider = Some(dialect);
        self
    }
}

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Abstract type.
    pub column_type: ColumnType,
    /// Maximum text length; beyond the dialect threshold the physical type
    /// is promoted to an unbounded text type.
    pub max_length: Option<u32>,
    /// Lower bound, enforced as a CHECK constraint.
    pub minimum: Option<i64>,
    /// Upper bound, enforced as a CHECK constraint.
    pub maximum: Option<i64>,
    /// Whether this column is the primary key. On an integer column this
    /// implies auto-increment.
    pub primary_key: bool,
    /// Whether this column has a UNIQUE constraint.
    pub unique: bool,
    /// Default value. Never combined with `generated`.
    pub default: DefaultValue,
    /// Automatic timestamp semantics; takes precedence over `default`.
    pub date_on: Option<DateOn>,
    /// Generated-column expression.
    pub generated: Option<GeneratedExpr>,
    /// Inline boolean expression enforced as a CHECK constraint. Trusted.
    pub check: Option<String>,
    /// Composite index anchored at this column.
    pub index: Option<IndexSchema>,
    /// Column description; becomes a SQL comment where supported.
    pub description: Option<String>,
}

impl ColumnSchema {
    /// Creates a new column schema.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            max_length: None,
            minimum: None,
            maximum: None,
            primary_key: false,
            unique: false,
            default: DefaultValue::None,
            date_on: None,
            generated: None,
            check: None,
            index: None,
            description: None,
        }
    }

    /// Sets the maximum text length.
    #[must_use]
    pub fn max_length(mut self, length: u32) -> Self {
        self.max_length = Some(length);
        self
    }

    /// Sets the lower bound.
    #[must_use]
    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub fn maximum(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: DefaultValue) -> Self {
        self.default = value;
        self
    }

    /// Sets automatic timestamp semantics.
    #[must_use]
    pub fn date_on(mut self, on: DateOn) -> Self {
        self.date_on = Some(on);
        self
    }

    /// Sets a dialect-neutral generated expression.
    #[must_use]
    pub fn generated(mut self, expr: impl Into<String>) -> Self {
        self.generated = Some(GeneratedExpr::Single(expr.into()));
        self
    }

    /// Sets per-dialect generated expressions.
    #[must_use]
    pub fn generated_per_dialect(mut self, map: HashMap<Dialect, String>) -> Self {
        self.generated = Some(GeneratedExpr::PerDialect(map));
        self
    }

    /// Sets an inline check expression.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    /// Anchors a composite index at this column.
    #[must_use]
    pub fn index(mut self, index: IndexSchema) -> Self {
        self.index = Some(index);
        self
    }

    /// Sets the column description.
    #[must_use]
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Complete schema definition for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column definitions, in declaration order. Order drives column
    /// ordering and name padding in the generated DDL.
    pub columns: Vec<ColumnSchema>,
    /// Columns that must be NOT NULL.
    pub required: Vec<String>,
    /// Columns combined into one full-text index, in order.
    pub full_text: Vec<String>,
    /// Index definitions.
    pub indices: Vec<IndexSchema>,
    /// Relations to other tables.
    pub relations: Vec<RelationSchema>,
    /// Table-level CHECK constraints.
    pub checks: Vec<CheckConstraint>,
    /// Source identifier: relative path of the source definition, with the
    /// generation timestamp (unix milliseconds) as a fragment.
    pub source: Option<String>,
    /// Content etag of the source definition at generation time.
    pub etag: Option<String>,
}

impl TableSchema {
    /// Creates a new table schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            required: Vec::new(),
            full_text: Vec::new(),
            indices: Vec::new(),
            relations: Vec::new(),
            checks: Vec::new(),
            source: None,
            etag: None,
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Marks a column as required (NOT NULL).
    #[must_use]
    pub fn require(mut self, column: impl Into<String>) -> Self {
        self.required.push(column.into());
        self
    }

    /// Sets the full-text column list.
    #[must_use]
    pub fn full_text(mut self, columns: Vec<&str>) -> Self {
        self.full_text = columns.into_iter().map(String::from).collect();
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: IndexSchema) -> Self {
        self.indices.push(index);
        self
    }

    /// Adds a relation.
    #[must_use]
    pub fn relation(mut self, relation: RelationSchema) -> Self {
        self.relations.push(relation);
        self
    }

    /// Adds a table-level check constraint.
    #[must_use]
    pub fn check(mut self, check: CheckConstraint) -> Self {
        self.checks.push(check);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Checks the internal reference invariants.
    ///
    /// Every name mentioned in `required`, `full_text`, index column lists
    /// and relation joins must be a declared column, array positions must be
    /// in range, and generated columns must not carry defaults. Violations
    /// fail before any SQL is emitted.
    pub fn validate(&self) -> Result<()> {
        let declared: HashSet<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let check_ref = |column: &str| -> Result<()> {
            if declared.contains(column) {
                Ok(())
            } else {
                Err(SchemaError::UnknownColumn {
                    table: self.name.clone(),
                    column: String::from(column),
                })
            }
        };

        for name in &self.required {
            check_ref(name)?;
        }
        for name in &self.full_text {
            check_ref(name)?;
        }
        for relation in &self.relations {
            check_ref(&relation.join)?;
        }

        let column_indices = self.columns.iter().filter_map(|c| c.index.as_ref());
        for index in self.indices.iter().chain(column_indices) {
            for name in &index.columns {
                check_ref(name)?;
            }
            if let Some(position) = index.array {
                if position >= index.columns.len() {
                    return Err(SchemaError::InvalidIndex {
                        table: self.name.clone(),
                        position,
                    });
                }
            }
        }

        for column in &self.columns {
            if column.generated.is_some() && !column.default.is_none() {
                return Err(SchemaError::GeneratedWithDefault(column.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_schema_builder() {
        let col = ColumnSchema::new("id", ColumnType::Integer).primary_key();
        assert_eq!(col.name, "id");
        assert!(col.primary_key);
        assert!(col.default.is_none());
    }

    #[test]
    fn test_table_builder_preserves_declaration_order() {
        let table = TableSchema::new("users")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(ColumnSchema::new("name", ColumnType::Text))
            .column(ColumnSchema::new("email", ColumnType::Text));

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "email"]);
    }

    #[test]
    fn test_validate_accepts_consistent_schema() {
        let table = TableSchema::new("posts")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(ColumnSchema::new("author_id", ColumnType::Integer))
            .require("author_id")
            .relation(RelationSchema::new("author", "author_id", "users"))
            .index(IndexSchema::new(vec!["author_id"]));

        assert!(table.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_dangling_required() {
        let table = TableSchema::new("posts")
            .column(ColumnSchema::new("id", ColumnType::Integer))
            .require("missing");

        let err = table.validate().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownColumn { column, .. } if column == "missing"
        ));
    }

    #[test]
    fn test_validate_rejects_dangling_relation_join() {
        let table = TableSchema::new("posts")
            .column(ColumnSchema::new("id", ColumnType::Integer))
            .relation(RelationSchema::new("author", "author_id", "users"));

        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_array_position_out_of_range() {
        let table = TableSchema::new("posts")
            .column(ColumnSchema::new("tags", ColumnType::JsonArray))
            .index(IndexSchema::new(vec!["tags"]).array(1));

        let err = table.validate().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndex { position: 1, .. }));
    }

    #[test]
    fn test_validate_rejects_generated_with_default() {
        let table = TableSchema::new("posts").column(
            ColumnSchema::new("slug", ColumnType::Text)
                .generated("LOWER(title)")
                .default(DefaultValue::Text(String::from("x"))),
        );

        assert!(matches!(
            table.validate().unwrap_err(),
            SchemaError::GeneratedWithDefault(column) if column == "slug"
        ));
    }

    #[test]
    fn test_default_value_to_sql() {
        assert_eq!(DefaultValue::None.to_sql(), None);
        assert_eq!(DefaultValue::Null.to_sql(), Some(String::from("NULL")));
        assert_eq!(DefaultValue::Bool(true).to_sql(), Some(String::from("TRUE")));
        assert_eq!(DefaultValue::Integer(42).to_sql(), Some(String::from("42")));
        assert_eq!(
            DefaultValue::Text(String::from("it's")).to_sql(),
            Some(String::from("'it''s'"))
        );
        assert_eq!(
            DefaultValue::Expression(String::from("(1 + 1)")).to_sql(),
            Some(String::from("(1 + 1)"))
        );
    }

    #[test]
    fn test_json_default_renders_parenthesized_literal() {
        let value = serde_json::json!({"tags": []});
        assert_eq!(
            DefaultValue::Json(value).to_sql(),
            Some(String::from("('{\"tags\":[]}')"))
        );
    }

    #[test]
    fn test_generated_expr_per_dialect_lookup() {
        let mut map = HashMap::new();
        map.insert(Dialect::MySql, String::from("a + b"));
        let expr = GeneratedExpr::PerDialect(map);
        assert_eq!(expr.for_dialect(Dialect::MySql), Some("a + b"));
        assert_eq!(expr.for_dialect(Dialect::Sqlite), None);
    }

    #[test]
    fn test_schema_serde_round_trip() {
        let table = TableSchema::new("users")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
            .column(
                ColumnSchema::new("name", ColumnType::Text)
                    .max_length(64)
                    .description("display name"),
            )
            .require("name")
            .check(CheckConstraint::named("users_name", "LENGTH(name) > 0"));

        let json = serde_json::to_string(&table).unwrap();
        let back: TableSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
