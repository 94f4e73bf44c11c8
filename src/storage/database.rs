//! Database operations using rusqlite.
//!
//! T009: Implement Database struct with connection and migration
//! T040: Implement transactional replace of sets
//! T041: Implement transactional replace of weekly_e1rm
//!
//! Both replace operations delete and insert inside one transaction, so a
//! reader sees either the previous table contents or the new ones, never a
//! half-truncated table. Concurrent writers are not supported; runs must be
//! serialized by the operator.

use crate::ingest::types::{NewSet, RawSet};
use crate::metrics::e1rm::format_date;
use crate::metrics::types::{SetRecord, WeeklyMetric};
use crate::storage::schema::{
    CURRENT_VERSION, SCHEMA_VERSION_TABLE, SETS_TABLE, WEEKLY_E1RM_TABLE,
};
use rusqlite::{params, Connection, Result as SqliteResult};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Database wrapper for SQLite operations.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::IoError(e.to_string()))?;
            }
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn, path: None };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        // Create schema version table
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        // Check current version
        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            // Initial schema
            self.conn
                .execute_batch(SETS_TABLE)
                .and_then(|_| self.conn.execute_batch(WEEKLY_E1RM_TABLE))
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            // Record version
            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    /// Get a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Human-readable location for log messages.
    pub fn location(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }

    // ========== Sets (T040) ==========

    /// Replace every row of `sets` with `sets`, atomically.
    ///
    /// The AUTOINCREMENT counter is reset in the same transaction so that
    /// re-ingesting the same input reproduces the same ids.
    pub fn replace_sets(&mut self, sets: &[NewSet]) -> Result<usize, DatabaseError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute_batch(SETS_TABLE)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        tx.execute("DELETE FROM sets", [])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'sets'", [])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO sets (date, exercise, weight_kg, reps, set_number,
                     session_name, session_id)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            for set in sets {
                stmt.execute(params![
                    format_date(set.date),
                    set.exercise.as_str(),
                    set.weight_kg,
                    set.reps,
                    set.set_number,
                    set.session_name,
                    set.session_id,
                ])
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            }
        }

        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM sets", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(count as usize)
    }

    /// Load all stored sets ordered by id.
    pub fn load_sets(&self) -> Result<Vec<RawSet>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, date, exercise, weight_kg, reps, set_number, session_name, session_id
                 FROM sets ORDER BY id",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawSet {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    exercise: row.get(2)?,
                    weight_kg: row.get(3)?,
                    reps: row.get(4)?,
                    set_number: row.get(5)?,
                    session_name: row.get(6)?,
                    session_id: row.get(7)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut sets = Vec::new();
        for row in rows {
            sets.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(sets)
    }

    /// Load the columns the weekly aggregation needs.
    pub fn load_set_records(&self) -> Result<Vec<SetRecord>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, date, exercise, weight_kg, reps FROM sets ORDER BY id")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SetRecord {
                    id: row.get(0)?,
                    date: row.get(1)?,
                    exercise: row.get(2)?,
                    weight_kg: row.get(3)?,
                    reps: row.get(4)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(records)
    }

    /// Count sets in the database.
    pub fn count_sets(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sets", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }

    /// Count sets per exercise, sorted by exercise name.
    pub fn count_sets_by_exercise(&self) -> Result<Vec<(String, usize)>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT exercise, COUNT(*) FROM sets GROUP BY exercise ORDER BY exercise")
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                let exercise: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((exercise, count as usize))
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(counts)
    }

    // ========== Weekly e1RM (T041) ==========

    /// Replace every row of `weekly_e1rm` with `metrics`, atomically.
    ///
    /// The stored row count is checked against the number of distinct
    /// (week_start, exercise) pairs before committing.
    pub fn replace_weekly_metrics(
        &mut self,
        metrics: &[WeeklyMetric],
    ) -> Result<usize, DatabaseError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        tx.execute_batch(WEEKLY_E1RM_TABLE)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        tx.execute("DELETE FROM weekly_e1rm", [])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        {
            let mut stmt = tx
                .prepare("INSERT INTO weekly_e1rm (week_start, exercise, e1rm) VALUES (?1, ?2, ?3)")
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

            for metric in metrics {
                stmt.execute(params![metric.week_start, metric.exercise, metric.e1rm])
                    .map_err(|e| match e {
                        rusqlite::Error::SqliteFailure(err, _)
                            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                        {
                            DatabaseError::ConstraintViolation(format!(
                                "duplicate weekly metric ({}, {})",
                                metric.week_start, metric.exercise
                            ))
                        }
                        e => DatabaseError::QueryFailed(e.to_string()),
                    })?;
            }
        }

        let count: i64 = tx
            .query_row("SELECT COUNT(*) FROM weekly_e1rm", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        if count as usize != metrics.len() {
            // Dropping the transaction rolls it back.
            return Err(DatabaseError::ConstraintViolation(format!(
                "weekly_e1rm holds {} rows, expected {}",
                count,
                metrics.len()
            )));
        }

        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        Ok(count as usize)
    }

    /// Load weekly metrics ordered by week_start, then exercise.
    pub fn load_weekly_metrics(&self) -> Result<Vec<WeeklyMetric>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT week_start, exercise, e1rm FROM weekly_e1rm
                 ORDER BY week_start, exercise",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(WeeklyMetric {
                    week_start: row.get(0)?,
                    exercise: row.get(1)?,
                    e1rm: row.get(2)?,
                })
            })
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut metrics = Vec::new();
        for row in rows {
            metrics.push(row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?);
        }

        Ok(metrics)
    }

    /// Count weekly metrics in the database.
    pub fn count_weekly_metrics(&self) -> Result<usize, DatabaseError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM weekly_e1rm", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(count as usize)
    }
}

/// Database errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}
