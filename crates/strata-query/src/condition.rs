//! Filter conditions and WHERE-clause compilation.
//!
//! A [`Condition`] is a recursive tree of predicates and boolean
//! combinators. [`compile_where`] renders it to a parameterized SQL boolean
//! expression plus the ordered argument list, dialect-aware for full-text
//! and containment operators. Trees can be built directly or parsed from
//! their JSON wire shape with [`Condition::from_value`].

use serde_json::Value;
use strata_core::{
    coalesce_concat, ContainsKind, Dialect, Fragment, FullTextKind, SqlValue,
};

use crate::error::{QueryError, Result};

/// Comparison and membership operators available in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equal; renders `IS` against NULL.
    Eq,
    /// Not equal; renders `IS NOT` against NULL.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Membership in a list; one placeholder per element.
    In,
    /// Non-membership in a list.
    NotIn,
    /// JSON/array containment.
    Contains,
    /// Full-text match, or `LIKE` where full text is unavailable.
    Match,
}

impl Operator {
    /// Parses a wire-format operator key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Ne),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            "nin" => Some(Self::NotIn),
            "contains" => Some(Self::Contains),
            "match" => Some(Self::Match),
            _ => None,
        }
    }

    const fn comparison(self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::Ne => Some("!="),
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            _ => None,
        }
    }
}

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Conjunction. Children join with `AND`; an empty conjunction is TRUE.
    And(Vec<Condition>),
    /// Disjunction, parenthesized as a unit; empty is TRUE.
    Or(Vec<Condition>),
    /// One comparison against one column.
    Predicate {
        /// Column name.
        column: String,
        /// Operator.
        op: Operator,
        /// Right-hand value; a [`SqlValue::List`] for `In`/`NotIn`.
        value: SqlValue,
    },
    /// Verbatim boolean SQL, contributing no arguments. Trusted input,
    /// equivalent to string-concatenated SQL.
    Raw(String),
}

impl Condition {
    /// The empty condition; compiles to `TRUE`.
    #[must_use]
    pub const fn empty() -> Self {
        Self::And(Vec::new())
    }

    /// Builds a single predicate.
    #[must_use]
    pub fn predicate(column: impl Into<String>, op: Operator, value: SqlValue) -> Self {
        Self::Predicate {
            column: column.into(),
            op,
            value,
        }
    }

    /// Parses the JSON wire shape of a condition.
    ///
    /// An object maps column names to operator objects (`{"age": {"gte":
    /// 18}}`), with bare values as sugar for `eq`. The keys `and`/`or` hold
    /// arrays of nested conditions and `$sql` holds a verbatim expression.
    /// When one predicate object carries several operator keys, the last
    /// key in insertion order wins; earlier keys are dropped.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::empty()),
            Value::Object(map) => {
                let mut children = Vec::with_capacity(map.len());
                for (key, entry) in map {
                    children.push(Self::from_entry(key, entry)?);
                }
                if children.len() == 1 {
                    Ok(children.remove(0))
                } else {
                    Ok(Self::And(children))
                }
            }
            other => Err(QueryError::InvalidCondition(format!(
                "expected an object, got {other}"
            ))),
        }
    }

    fn from_entry(key: &str, value: &Value) -> Result<Self> {
        match key {
            "and" | "or" => {
                let Value::Array(items) = value else {
                    return Err(QueryError::InvalidCondition(format!(
                        "'{key}' expects an array of conditions"
                    )));
                };
                let children = items
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>>>()?;
                if key == "and" {
                    Ok(Self::And(children))
                } else {
                    Ok(Self::Or(children))
                }
            }
            "$sql" => value
                .as_str()
                .map(|sql| Self::Raw(String::from(sql)))
                .ok_or_else(|| {
                    QueryError::InvalidCondition(String::from("'$sql' expects a string"))
                }),
            column => Self::from_predicate(column, value),
        }
    }

    fn from_predicate(column: &str, value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            // Bare value: sugar for equality.
            return Ok(Self::predicate(column, Operator::Eq, scalar_value(value)));
        };

        // Several operator keys collapse to the last one in insertion order.
        let mut selected: Option<(Operator, &Value)> = None;
        for (key, entry) in map {
            let op = Operator::from_key(key).ok_or_else(|| {
                QueryError::InvalidCondition(format!(
                    "unknown operator '{key}' on column '{column}'"
                ))
            })?;
            selected = Some((op, entry));
        }
        let Some((op, entry)) = selected else {
            return Err(QueryError::InvalidCondition(format!(
                "empty predicate on column '{column}'"
            )));
        };

        let value = match op {
            Operator::In | Operator::NotIn => {
                let Value::Array(items) = entry else {
                    return Err(QueryError::InvalidCondition(format!(
                        "'{column}' membership test expects an array"
                    )));
                };
                SqlValue::List(items.iter().map(scalar_value).collect())
            }
            _ => scalar_value(entry),
        };
        Ok(Self::predicate(column, op, value))
    }
}

fn scalar_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map_or_else(|| SqlValue::Float(n.as_f64().unwrap_or(f64::NAN)), SqlValue::Int),
        Value::String(s) => SqlValue::Text(s.clone()),
        // Documents compare against their serialized form.
        other => SqlValue::Text(other.to_string()),
    }
}

/// Compiles a condition into a SQL boolean expression and its arguments.
///
/// `full_text` is the schema's full-text column set; it decides how `match`
/// predicates render. An empty condition compiles to `TRUE`.
pub fn compile_where(
    condition: &Condition,
    dialect: Dialect,
    full_text: &[String],
) -> Result<(String, Vec<SqlValue>)> {
    let quote = dialect.profile().quote;
    match render(condition, dialect, full_text)? {
        Some((fragment, args)) => Ok((fragment.render(quote), args)),
        None => Ok((String::from("TRUE"), Vec::new())),
    }
}

type Rendered = Option<(Fragment, Vec<SqlValue>)>;

fn render(condition: &Condition, dialect: Dialect, full_text: &[String]) -> Result<Rendered> {
    match condition {
        Condition::And(children) => render_group(children, " AND ", false, dialect, full_text),
        Condition::Or(children) => render_group(children, " OR ", true, dialect, full_text),
        Condition::Raw(sql) => Ok(Some((Fragment::lit(sql.clone()), Vec::new()))),
        Condition::Predicate { column, op, value } => {
            render_predicate(column, *op, value, dialect, full_text)
        }
    }
}

fn render_group(
    children: &[Condition],
    connective: &str,
    parenthesize: bool,
    dialect: Dialect,
    full_text: &[String],
) -> Result<Rendered> {
    if children.is_empty() {
        return Ok(Some((Fragment::lit("TRUE"), Vec::new())));
    }

    let mut parts = Vec::with_capacity(children.len());
    let mut args = Vec::new();
    for child in children {
        if let Some((fragment, child_args)) = render(child, dialect, full_text)? {
            parts.push(fragment);
            args.extend(child_args);
        }
    }

    match parts.len() {
        // Every child was skipped; the group contributes nothing.
        0 => Ok(None),
        1 => Ok(Some((parts.remove(0), args))),
        _ => {
            let joined = Fragment::join(parts, connective);
            let fragment = if parenthesize { joined.parens() } else { joined };
            Ok(Some((fragment, args)))
        }
    }
}

fn render_predicate(
    column: &str,
    op: Operator,
    value: &SqlValue,
    dialect: Dialect,
    full_text: &[String],
) -> Result<Rendered> {
    let profile = dialect.profile();
    match op {
        Operator::Eq | Operator::Ne if value.is_null() => {
            let connective = if op == Operator::Eq { " IS " } else { " IS NOT " };
            Ok(Some((
                Fragment::Seq(vec![
                    Fragment::ident(column),
                    Fragment::lit(connective),
                    Fragment::Placeholder,
                ]),
                vec![SqlValue::Null],
            )))
        }

        Operator::In | Operator::NotIn => {
            let SqlValue::List(items) = value else {
                return Err(QueryError::InvalidCondition(format!(
                    "'{column}' membership test expects a list value"
                )));
            };
            if items.is_empty() {
                return Err(QueryError::InvalidCondition(format!(
                    "'{column}' membership test against an empty list"
                )));
            }
            let placeholders: Vec<&str> = items.iter().map(|_| "?").collect();
            let keyword = if op == Operator::In { " IN (" } else { " NOT IN (" };
            Ok(Some((
                Fragment::Seq(vec![
                    Fragment::ident(column),
                    Fragment::lit(keyword),
                    Fragment::lit(placeholders.join(", ")),
                    Fragment::lit(")"),
                ]),
                items.clone(),
            )))
        }

        Operator::Contains => Ok(Some(match profile.contains {
            ContainsKind::MemberOf => (
                Fragment::Seq(vec![
                    Fragment::Placeholder,
                    Fragment::lit(" MEMBER OF ("),
                    Fragment::ident(column),
                    Fragment::lit(")"),
                ]),
                vec![value.clone()],
            ),
            ContainsKind::JsonbExists => (
                Fragment::Seq(vec![
                    Fragment::lit("JSONB_EXISTS(CAST("),
                    Fragment::ident(column),
                    Fragment::lit(" AS JSONB), ?)"),
                ]),
                vec![value.clone()],
            ),
            ContainsKind::Like => (
                like_fragment(column),
                vec![SqlValue::Text(format!("%{}%", text_of(value)))],
            ),
        })),

        Operator::Match => {
            // An absent search term skips the predicate entirely, so call
            // sites can pass optional terms unconditionally.
            if value.is_falsy() {
                return Ok(None);
            }
            let term = text_of(value);
            if !full_text.is_empty() {
                match profile.fulltext {
                    FullTextKind::InlineIndex => {
                        return Ok(Some((
                            Fragment::lit(format!(
                                "MATCH({}) AGAINST (? IN BOOLEAN MODE)",
                                full_text.join(", ")
                            )),
                            // Trailing star for prefix matching.
                            vec![SqlValue::Text(format!("{term}*"))],
                        )));
                    }
                    FullTextKind::TsVector => {
                        return Ok(Some((
                            Fragment::lit(format!(
                                "TO_TSVECTOR('english', {}) @@ TO_TSQUERY(?)",
                                coalesce_concat(full_text)
                            )),
                            vec![SqlValue::Text(term)],
                        )));
                    }
                    FullTextKind::Unsupported => {}
                }
            }
            Ok(Some((
                like_fragment(column),
                vec![SqlValue::Text(format!("%{term}%"))],
            )))
        }

        _ => {
            let Some(symbol) = op.comparison() else {
                return Err(QueryError::InvalidCondition(format!(
                    "operator {op:?} cannot be rendered for column '{column}'"
                )));
            };
            Ok(Some((
                Fragment::Seq(vec![
                    Fragment::ident(column),
                    Fragment::lit(format!(" {symbol} ")),
                    Fragment::Placeholder,
                ]),
                vec![value.clone()],
            )))
        }
    }
}

fn like_fragment(column: &str) -> Fragment {
    Fragment::Seq(vec![
        Fragment::ident(column),
        Fragment::lit(" LIKE "),
        Fragment::Placeholder,
    ])
}

fn text_of(value: &SqlValue) -> String {
    match value {
        SqlValue::Text(s) => s.clone(),
        other => other.to_sql_inline(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(value: serde_json::Value, dialect: Dialect) -> (String, Vec<SqlValue>) {
        let condition = Condition::from_value(&value).unwrap();
        compile_where(&condition, dialect, &[]).unwrap()
    }

    fn full_text_columns() -> Vec<String> {
        vec![String::from("title"), String::from("body")]
    }

    #[test]
    fn test_implicit_conjunction() {
        let (sql, args) = compile(json!({"a": 1, "b": 2}), Dialect::Sqlite);
        assert_eq!(sql, "a = ? AND b = ?");
        assert_eq!(args, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn test_null_equality_renders_is() {
        let (sql, args) = compile(json!({"a": null}), Dialect::Sqlite);
        assert_eq!(sql, "a IS ?");
        assert_eq!(args, vec![SqlValue::Null]);
    }

    #[test]
    fn test_null_inequality_renders_is_not() {
        let (sql, args) = compile(json!({"a": {"neq": null}}), Dialect::Sqlite);
        assert_eq!(sql, "a IS NOT ?");
        assert_eq!(args, vec![SqlValue::Null]);
    }

    #[test]
    fn test_or_combinator_is_parenthesized() {
        let (sql, args) = compile(
            json!({"or": [{"x": "X"}, {"d": {"lte": "2024-01-01"}}]}),
            Dialect::Sqlite,
        );
        assert_eq!(sql, "(x = ? OR d <= ?)");
        assert_eq!(
            args,
            vec![
                SqlValue::Text(String::from("X")),
                SqlValue::Text(String::from("2024-01-01")),
            ]
        );
    }

    #[test]
    fn test_empty_condition_compiles_to_true() {
        assert_eq!(compile(json!({}), Dialect::Sqlite).0, "TRUE");
        assert_eq!(compile(json!({"and": []}), Dialect::Sqlite).0, "TRUE");
        assert_eq!(compile(json!({"or": []}), Dialect::Sqlite).0, "TRUE");
    }

    #[test]
    fn test_in_list_explodes_placeholders() {
        let (sql, args) = compile(json!({"status": {"in": ["a", "p"]}}), Dialect::Sqlite);
        assert_eq!(sql, "status IN (?, ?)");
        assert_eq!(args.len(), 2);

        let (sql, _) = compile(json!({"status": {"nin": [1, 2, 3]}}), Dialect::Sqlite);
        assert_eq!(sql, "status NOT IN (?, ?, ?)");
    }

    #[test]
    fn test_empty_in_list_is_rejected() {
        let condition = Condition::from_value(&json!({"status": {"in": []}})).unwrap();
        assert!(matches!(
            compile_where(&condition, Dialect::Sqlite, &[]).unwrap_err(),
            QueryError::InvalidCondition(_)
        ));
    }

    #[test]
    fn test_contains_per_dialect() {
        let (sql, args) = compile(json!({"tags": {"contains": "rust"}}), Dialect::MySql);
        assert_eq!(sql, "? MEMBER OF (tags)");
        assert_eq!(args, vec![SqlValue::Text(String::from("rust"))]);

        let (sql, _) = compile(json!({"tags": {"contains": "rust"}}), Dialect::Postgres);
        assert_eq!(sql, "JSONB_EXISTS(CAST(tags AS JSONB), ?)");

        let (sql, args) = compile(json!({"tags": {"contains": "rust"}}), Dialect::Sqlite);
        assert_eq!(sql, "tags LIKE ?");
        assert_eq!(args, vec![SqlValue::Text(String::from("%rust%"))]);
    }

    #[test]
    fn test_match_without_full_text_columns_falls_back_to_like() {
        let (sql, args) = compile(json!({"title": {"match": "term"}}), Dialect::Sqlite);
        assert_eq!(sql, "title LIKE ?");
        assert_eq!(args, vec![SqlValue::Text(String::from("%term%"))]);
    }

    #[test]
    fn test_match_mysql_uses_boolean_mode_with_prefix_star() {
        let condition = Condition::from_value(&json!({"title": {"match": "term"}})).unwrap();
        let (sql, args) =
            compile_where(&condition, Dialect::MySql, &full_text_columns()).unwrap();
        assert_eq!(sql, "MATCH(title, body) AGAINST (? IN BOOLEAN MODE)");
        assert_eq!(args, vec![SqlValue::Text(String::from("term*"))]);
    }

    #[test]
    fn test_match_postgres_uses_tsvector_over_coalesced_columns() {
        let condition = Condition::from_value(&json!({"title": {"match": "term"}})).unwrap();
        let (sql, args) =
            compile_where(&condition, Dialect::Postgres, &full_text_columns()).unwrap();
        assert_eq!(
            sql,
            "TO_TSVECTOR('english', COALESCE(title, '') || ' ' || COALESCE(body, '')) @@ TO_TSQUERY(?)"
        );
        assert_eq!(args, vec![SqlValue::Text(String::from("term"))]);
    }

    #[test]
    fn test_match_on_sqlite_ignores_full_text_columns() {
        let condition = Condition::from_value(&json!({"title": {"match": "term"}})).unwrap();
        let (sql, _) = compile_where(&condition, Dialect::Sqlite, &full_text_columns()).unwrap();
        assert_eq!(sql, "title LIKE ?");
    }

    #[test]
    fn test_falsy_match_is_skipped() {
        let (sql, args) = compile(json!({"title": {"match": ""}}), Dialect::MySql);
        assert_eq!(sql, "TRUE");
        assert!(args.is_empty());

        // The skipped predicate leaves its siblings intact.
        let (sql, args) = compile(
            json!({"title": {"match": ""}, "status": "open"}),
            Dialect::MySql,
        );
        assert_eq!(sql, "status = ?");
        assert_eq!(args, vec![SqlValue::Text(String::from("open"))]);
    }

    #[test]
    fn test_raw_escape_renders_verbatim() {
        let (sql, args) = compile(
            json!({"$sql": "deleted_at IS NULL", "a": 1}),
            Dialect::Sqlite,
        );
        assert_eq!(sql, "deleted_at IS NULL AND a = ?");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_last_operator_key_wins() {
        let (sql, args) = compile(json!({"a": {"gt": 1, "lte": 5}}), Dialect::Sqlite);
        assert_eq!(sql, "a <= ?");
        assert_eq!(args, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn test_unknown_operator_key_is_rejected() {
        let err = Condition::from_value(&json!({"a": {"almost": 1}})).unwrap_err();
        assert!(matches!(err, QueryError::InvalidCondition(message) if message.contains("almost")));
    }

    #[test]
    fn test_non_object_condition_is_rejected() {
        assert!(Condition::from_value(&json!("where")).is_err());
        assert!(Condition::from_value(&json!(42)).is_err());
    }

    #[test]
    fn test_nested_combinators() {
        let (sql, args) = compile(
            json!({"and": [{"or": [{"a": 1}, {"b": 2}]}, {"c": {"gte": 3}}]}),
            Dialect::Sqlite,
        );
        assert_eq!(sql, "(a = ? OR b = ?) AND c >= ?");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_quoted_identifier_when_not_a_bare_word() {
        let condition = Condition::predicate("select count", Operator::Eq, SqlValue::Int(1));
        let (sql, _) = compile_where(&condition, Dialect::MySql, &[]).unwrap();
        assert_eq!(sql, "`select count` = ?");
    }
}
