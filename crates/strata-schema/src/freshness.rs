//! Schema freshness tracking.
//!
//! A generated schema records where it came from (`source`, a relative path
//! with the generation timestamp as a fragment) and what the source looked
//! like (`etag`, SHA-256 of the source content). [`is_outdated`] decides
//! whether the schema must be regenerated: the timestamp stage only needs a
//! `stat`, so the content etag is recomputed only when the identifier
//! carries no timestamp to compare.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::schema::TableSchema;

/// Returns `true` if the schema is stale relative to its source definition.
///
/// Filesystem errors (missing or unreadable source) propagate to the caller;
/// retrying is the caller's decision.
pub fn is_outdated(schema: &TableSchema, base: &Path) -> Result<bool> {
    let source = schema
        .source
        .as_deref()
        .ok_or_else(|| SchemaError::MissingSource(schema.name.clone()))?;

    let (relative, generated_at) = match source.split_once('#') {
        Some((relative, fragment)) => (relative, fragment.parse::<i64>().ok()),
        None => (source, None),
    };
    let path = base.join(relative);

    if let Some(generated_at) = generated_at {
        let modified = fs::metadata(&path)?.modified()?;
        let modified_at = DateTime::<Utc>::from(modified).timestamp_millis();
        debug!(
            table = %schema.name,
            generated_at,
            modified_at,
            "comparing source modification time"
        );
        return Ok(modified_at > generated_at);
    }

    // No generation timestamp recorded; fall back to the content etag.
    let stored = schema
        .etag
        .as_deref()
        .ok_or_else(|| SchemaError::MissingEtag(schema.name.clone()))?;
    let current = content_etag(&path)?;
    debug!(table = %schema.name, stored, current, "comparing source etag");
    Ok(stored != current)
}

/// Computes the hex SHA-256 etag of a source file's content.
pub fn content_etag(path: &Path) -> Result<String> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Records generation metadata on a schema: the source identifier with the
/// generation timestamp, and the current content etag of the source.
pub fn stamp(
    schema: &mut TableSchema,
    base: &Path,
    relative: &str,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    schema.etag = Some(content_etag(&base.join(relative))?);
    schema.source = Some(format!("{relative}#{}", generated_at.timestamp_millis()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSchema, ColumnType};
    use chrono::Duration;

    fn users_schema() -> TableSchema {
        TableSchema::new("users")
            .column(ColumnSchema::new("id", ColumnType::Integer).primary_key())
    }

    #[test]
    fn test_fresh_after_stamp() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.json"), b"{}").unwrap();

        let mut schema = users_schema();
        // Stamp strictly after the write so the mtime cannot be newer.
        let stamped_at = Utc::now() + Duration::seconds(1);
        stamp(&mut schema, dir.path(), "users.json", stamped_at).unwrap();

        assert!(!is_outdated(&schema, dir.path()).unwrap());
    }

    #[test]
    fn test_outdated_when_source_is_newer() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.json"), b"{}").unwrap();

        let mut schema = users_schema();
        schema.source = Some(String::from("users.json#0"));

        assert!(is_outdated(&schema, dir.path()).unwrap());
    }

    #[test]
    fn test_etag_stage_without_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, b"{}").unwrap();

        let mut schema = users_schema();
        schema.source = Some(String::from("users.json"));
        schema.etag = Some(content_etag(&path).unwrap());
        assert!(!is_outdated(&schema, dir.path()).unwrap());

        fs::write(&path, b"{\"changed\":true}").unwrap();
        assert!(is_outdated(&schema, dir.path()).unwrap());
    }

    #[test]
    fn test_missing_source_identifier_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = is_outdated(&users_schema(), dir.path()).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSource(table) if table == "users"));
    }

    #[test]
    fn test_missing_etag_without_timestamp_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("users.json"), b"{}").unwrap();

        let mut schema = users_schema();
        schema.source = Some(String::from("users.json"));
        assert!(matches!(
            is_outdated(&schema, dir.path()).unwrap_err(),
            SchemaError::MissingEtag(_)
        ));
    }

    #[test]
    fn test_unreadable_source_propagates_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut schema = users_schema();
        schema.source = Some(String::from("absent.json#0"));
        assert!(matches!(
            is_outdated(&schema, dir.path()).unwrap_err(),
            SchemaError::Io(_)
        ));
    }

    #[test]
    fn test_content_etag_is_stable_hex() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(&path, b"{}").unwrap();

        let first = content_etag(&path).unwrap();
        let second = content_etag(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
