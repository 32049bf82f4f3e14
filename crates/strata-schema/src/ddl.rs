//! DDL generation.
//!
//! [`compile_create_table`] turns a [`TableSchema`] into the CREATE TABLE
//! statement (and, where the dialect keeps secondary indices outside the
//! table body, the trailing CREATE INDEX statements) for one dialect.
//! Output is deterministic: the same schema and dialect always produce
//! byte-identical text, so generated DDL can be diffed.

use strata_core::{coalesce_concat, Dialect, DialectProfile, FullTextKind};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::{ColumnSchema, ColumnType, DateOn, IndexSchema, RelationSchema, TableSchema};

/// Compiles a table schema into executable DDL for one dialect.
///
/// `table_override` replaces the schema's own table name when set. The
/// schema is validated first; nothing is rendered for an invalid schema.
pub fn compile_create_table(
    schema: &TableSchema,
    dialect: Dialect,
    table_override: Option<&str>,
) -> Result<String> {
    schema.validate()?;

    let table = table_override.unwrap_or(&schema.name);
    let profile = dialect.profile();
    debug!(table, dialect = %dialect, "generating CREATE TABLE");

    let width = schema.columns.iter().map(|c| c.name.len()).max().unwrap_or(0);

    let mut body: Vec<String> = Vec::new();
    for column in &schema.columns {
        body.push(column_clause(schema, column, dialect, width)?);
    }

    if profile.supports_foreign_keys {
        for relation in &schema.relations {
            body.push(foreign_key_clause(table, relation));
        }
    }

    // Sorted so that regenerated DDL diffs cleanly.
    let mut checks = check_clauses(schema, table, dialect);
    checks.sort();
    body.append(&mut checks);

    let indices = collect_indices(schema, table);
    let mut tail: Vec<String> = Vec::new();
    if profile.inline_indices {
        for index in &indices {
            body.push(format!(
                "{}INDEX {} ({})",
                if index.def.unique { "UNIQUE " } else { "" },
                index.name,
                index_columns(index.def, profile)
            ));
        }
        if !schema.full_text.is_empty() {
            body.push(format!(
                "FULLTEXT INDEX {}_fulltext ({})",
                table,
                schema.full_text.join(", ")
            ));
        }
    } else {
        for index in &indices {
            tail.push(format!(
                "CREATE {}INDEX {} ON {} ({});",
                if index.def.unique { "UNIQUE " } else { "" },
                index.name,
                table,
                index_columns(index.def, profile)
            ));
        }
        if profile.fulltext == FullTextKind::TsVector && !schema.full_text.is_empty() {
            tail.push(format!(
                "CREATE INDEX {}_fulltext ON {} USING GIN (TO_TSVECTOR('english', {}));",
                table,
                table,
                coalesce_concat(&schema.full_text)
            ));
        }
    }

    let mut sql = format!("CREATE TABLE {table} (\n");
    for clause in &body {
        sql.push_str("  ");
        sql.push_str(clause);
        sql.push_str(",\n");
    }
    // Normalization: drop the comma after the last clause.
    if sql.ends_with(",\n") {
        sql.truncate(sql.len() - 2);
        sql.push('\n');
    }
    sql.push_str(");");

    for statement in &tail {
        sql.push('\n');
        sql.push_str(statement);
    }

    if dialect == Dialect::Postgres {
        sql = postgres_rewrite(&sql, profile);
    }
    Ok(sql)
}

fn column_clause(
    schema: &TableSchema,
    column: &ColumnSchema,
    dialect: Dialect,
    width: usize,
) -> Result<String> {
    let profile = dialect.profile();
    let auto_increment = column.primary_key && column.column_type == ColumnType::Integer;

    let mut clause = format!("{:<width$} ", column.name);
    clause.push_str(&physical_type(column, profile, auto_increment));

    if let Some(generated) = &column.generated {
        let expr = generated.for_dialect(dialect).ok_or_else(|| {
            SchemaError::MissingGeneratedExpression {
                column: column.name.clone(),
                dialect,
            }
        })?;
        clause.push(' ');
        clause.push_str(profile.generated_open);
        clause.push_str(expr);
        clause.push_str(profile.generated_close);
    }

    let not_null = column.primary_key || schema.required.iter().any(|r| r == &column.name);
    if not_null {
        clause.push_str(" NOT NULL");
    }

    if column.generated.is_none() {
        match column.date_on {
            Some(DateOn::Insert) => clause.push_str(" DEFAULT CURRENT_TIMESTAMP"),
            Some(DateOn::Update) => {
                clause.push_str(" DEFAULT CURRENT_TIMESTAMP");
                if profile.supports_on_update_timestamp {
                    clause.push_str(" ON UPDATE CURRENT_TIMESTAMP");
                }
            }
            None => {
                if !auto_increment {
                    if let Some(default) = column.default.to_sql() {
                        clause.push_str(" DEFAULT ");
                        clause.push_str(&default);
                    }
                }
            }
        }
    }

    if column.primary_key {
        clause.push_str(" PRIMARY KEY");
    } else if column.unique {
        clause.push_str(" UNIQUE");
    }

    if auto_increment && profile.serial_type.is_none() && !profile.auto_increment.is_empty() {
        clause.push(' ');
        clause.push_str(profile.auto_increment);
    }

    if profile.supports_comments {
        if let Some(description) = &column.description {
            clause.push_str(" COMMENT ");
            clause.push_str(&strata_core::quote_str(description));
        }
    }

    Ok(clause)
}

fn physical_type(column: &ColumnSchema, profile: &DialectProfile, auto_increment: bool) -> String {
    if auto_increment {
        if let Some(serial) = profile.serial_type {
            return String::from(serial);
        }
    }
    match column.column_type {
        ColumnType::Boolean => String::from(profile.boolean_type),
        ColumnType::Integer => String::from(profile.integer_type),
        ColumnType::Number => String::from(profile.number_type),
        ColumnType::Date => String::from(profile.date_type),
        ColumnType::JsonObject | ColumnType::JsonArray => String::from(profile.json_type),
        ColumnType::Text => {
            let length = column.max_length.unwrap_or(255);
            if length > profile.max_inline_length {
                String::from(profile.unbounded_text_type)
            } else {
                format!("{}({length})", profile.text_type)
            }
        }
    }
}

fn foreign_key_clause(table: &str, relation: &RelationSchema) -> String {
    let mut clause = format!(
        "CONSTRAINT {}_{} FOREIGN KEY ({}) REFERENCES {} (id)",
        table, relation.name, relation.join, relation.target
    );
    if let Some(action) = relation.on_delete {
        clause.push_str(" ON DELETE ");
        clause.push_str(action.as_sql());
    }
    if let Some(action) = relation.on_update {
        clause.push_str(" ON UPDATE ");
        clause.push_str(action.as_sql());
    }
    clause
}

fn check_clauses(schema: &TableSchema, table: &str, dialect: Dialect) -> Vec<String> {
    let profile = dialect.profile();
    let mut clauses = Vec::new();

    for column in &schema.columns {
        let mut parts: Vec<String> = Vec::new();
        if let Some(expr) = &column.check {
            parts.push(expr.clone());
        }
        if let Some(minimum) = column.minimum {
            parts.push(format!("{} >= {minimum}", column.name));
        }
        if let Some(maximum) = column.maximum {
            parts.push(format!("{} <= {maximum}", column.name));
        }
        if !parts.is_empty() {
            let name = format!("{}_{}", table, column.name);
            clauses.push(render_check(Some(&name), &parts.join(" AND "), true, profile));
        }
    }

    for check in &schema.checks {
        if check.provider.is_none() || check.provider == Some(dialect) {
            clauses.push(render_check(
                check.name.as_deref(),
                &check.check,
                check.enforced,
                profile,
            ));
        }
    }

    clauses
}

fn render_check(
    name: Option<&str>,
    expr: &str,
    enforced: bool,
    profile: &DialectProfile,
) -> String {
    let mut clause = String::new();
    if profile.supports_named_checks {
        if let Some(name) = name {
            clause.push_str("CONSTRAINT ");
            clause.push_str(name);
            clause.push(' ');
        }
    }
    clause.push_str("CHECK (");
    clause.push_str(expr);
    clause.push(')');
    if !enforced && profile.supports_unenforced_checks {
        clause.push_str(" NOT ENFORCED");
    }
    clause
}

struct NamedIndex<'a> {
    name: String,
    def: &'a IndexSchema,
}

/// Union of table-level indices and per-column composite indices, named
/// after their constituent columns and sorted by name.
fn collect_indices<'a>(schema: &'a TableSchema, table: &str) -> Vec<NamedIndex<'a>> {
    let column_indices = schema.columns.iter().filter_map(|c| c.index.as_ref());
    let mut indices: Vec<NamedIndex<'a>> = Vec::new();
    for def in schema.indices.iter().chain(column_indices) {
        let name = format!("{}_{}", table, def.columns.join("_"));
        if !indices.iter().any(|existing| existing.name == name) {
            indices.push(NamedIndex { name, def });
        }
    }
    indices.sort_by(|a, b| a.name.cmp(&b.name));
    indices
}

fn index_columns(index: &IndexSchema, profile: &DialectProfile) -> String {
    let members: Vec<String> = index
        .columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            if index.array == Some(position) {
                format!(
                    "(CAST({column} AS {}{}))",
                    profile.array_cast_type,
                    if profile.array_keyword { " ARRAY" } else { "" }
                )
            } else {
                column.clone()
            }
        })
        .collect();
    members.join(", ")
}

/// Token renames applied to the finished statement for PostgreSQL.
///
/// Dialect-neutral expressions supplied by the schema (generated columns,
/// checks, defaults) may use the MySQL-family spellings; they are rewritten
/// here so expression text stays portable.
fn postgres_rewrite(sql: &str, profile: &DialectProfile) -> String {
    let regex_op = format!(" {} ", profile.regex_operator);
    sql.replace("DATETIME", "TIMESTAMP")
        .replace("JSON_EXTRACT", "JSONB_EXTRACT_PATH")
        .replace(" RLIKE ", &regex_op)
        .replace(" REGEXP ", &regex_op)
}
