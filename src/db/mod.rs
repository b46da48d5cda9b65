pub mod diagrams;
pub mod error;
mod schema;
pub mod versions;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

pub use diagrams::{
    create_diagram, delete_diagram, get_diagram, get_public_diagram, list_diagrams,
    save_diagram, set_public_sharing, update_diagram,
};
pub use versions::{
    delete_version, fetch_versions, get_version, save_version,
};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database file not found: {0}")]
    NotFound(String),
    #[error("Invalid diagram store: {0}")]
    InvalidFile(String),
    #[error("Diagram not found: {0}")]
    DiagramNotFound(String),
    #[error("Version not found: {0}")]
    VersionNotFound(String),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Connection to a diagram store
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing store
    pub fn new<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        if !path.as_ref().exists() {
            return Err(DatabaseError::NotFound(path_str).into());
        }

        let flags = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let conn = Connection::open_with_flags(path.as_ref(), flags)
            .with_context(|| format!("Failed to open diagram store: {}", path_str))?;

        Self::prepare(conn, !read_only, &path_str)
    }

    /// Open a store, creating the file if needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .with_context(|| format!("Failed to create diagram store: {}", path_str))?;

        Self::prepare(conn, true, &path_str)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::prepare(Connection::open_in_memory()?, true, ":memory:")
    }

    fn prepare(conn: Connection, writable: bool, path_str: &str) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")
            .context("Failed to enable foreign keys")?;

        conn.busy_timeout(std::time::Duration::from_secs(5))
            .context("Failed to set busy timeout")?;

        if writable {
            schema::migrate(&conn).map_err(|e| {
                if e.to_string().contains("not a database")
                    || e.to_string().contains("file is encrypted")
                {
                    DatabaseError::InvalidFile(path_str.to_string()).into()
                } else {
                    anyhow::Error::from(e).context("Failed to prepare diagram store schema")
                }
            })?;
        }

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Get the underlying connection (for worker thread)
    pub fn into_connection(self) -> Connection {
        self.conn
    }
}

/// Fixed-width RFC 3339 text, so lexical order matches time order
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    raw: &str,
) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Database::new(dir.path().join("nope.db"), false)
            .err()
            .expect("missing store should fail");
        assert!(matches!(
            err.downcast_ref::<DatabaseError>(),
            Some(DatabaseError::NotFound(_))
        ));
    }

    #[test]
    fn created_store_can_be_reopened() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagrams.db");
        let db = Database::create(&path).unwrap();
        create_diagram(db.connection(), "Shop", "").unwrap();
        drop(db);

        let db = Database::new(&path, true).unwrap();
        assert_eq!(list_diagrams(db.connection()).unwrap().len(), 1);
    }

    #[test]
    fn timestamps_sort_lexically() {
        let a = Utc::now();
        let b = a + chrono::Duration::microseconds(1);
        assert!(format_timestamp(&a) < format_timestamp(&b));
        let parsed = parse_timestamp(0, &format_timestamp(&a)).unwrap();
        assert_eq!(parsed.timestamp_micros(), a.timestamp_micros());
    }
}
