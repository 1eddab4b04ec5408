//! Local history store.

mod health;
mod predictions;
mod schema;

pub use schema::*;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Raw connection for ad hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Reject NaN, infinities and negative quantities before they reach storage.
fn check_non_negative(label: &str, value: f64) -> DbResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(DbError::Constraint(format!(
            "{label} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Re-render an RFC 3339 timestamp in UTC at fixed width so that stored
/// values sort chronologically as text.
fn normalize_timestamp(raw: &str) -> DbResult<String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|t| t.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Micros, true))
        .map_err(|e| DbError::Constraint(format!("timestamp must be RFC 3339, got {raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"health_data".to_string()));
        assert!(tables.contains(&"meal_logs".to_string()));
        assert!(tables.contains(&"insulin_predictions".to_string()));
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        {
            let db = Database::open(&path).unwrap();
            db.insert_health_data("u1", &crate::models::HealthDataPoint::new(140.0))
                .unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.recent_health_data("u1", 10).unwrap().len(), 1);
    }

    #[test]
    fn test_normalize_timestamp() {
        assert_eq!(
            normalize_timestamp("2024-05-01T10:00:00+05:30").unwrap(),
            "2024-05-01T04:30:00.000000Z"
        );
        assert_eq!(
            normalize_timestamp("2024-05-01T08:00:00.25Z").unwrap(),
            "2024-05-01T08:00:00.250000Z"
        );
        for bad in ["yesterday", "", "2024-05-01", "2024-05-01 08:00"] {
            assert!(
                matches!(normalize_timestamp(bad), Err(DbError::Constraint(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
