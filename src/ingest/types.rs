//! Ingest types and errors.
//!
//! T012: Define RawSet / NewSet structs
//! T013: Define IngestError enum

use crate::storage::database::DatabaseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Columns every input file must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "date",
    "exercise",
    "weight_kg",
    "reps",
    "set_number",
    "session_name",
];

/// Separator between date and session name in a derived session id.
pub const SESSION_ID_SEPARATOR: &str = " | ";

/// Exercises the pipeline tracks. Anything else is dropped during ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Exercise {
    Squat,
    #[serde(rename = "Bench Press")]
    BenchPress,
    Deadlift,
}

impl Exercise {
    /// All allowed exercises, sorted by display name.
    pub const ALL: [Exercise; 3] = [Exercise::BenchPress, Exercise::Deadlift, Exercise::Squat];

    /// Exact (case-sensitive) match against the allow-list.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "Squat" => Some(Exercise::Squat),
            "Bench Press" => Some(Exercise::BenchPress),
            "Deadlift" => Some(Exercise::Deadlift),
            _ => None,
        }
    }

    /// Name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Squat => "Squat",
            Exercise::BenchPress => "Bench Press",
            Exercise::Deadlift => "Deadlift",
        }
    }

    /// Allow-list names, sorted, for diagnostics.
    pub fn allowed_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Exercise::as_str).collect()
    }
}

impl std::fmt::Display for Exercise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated set ready to be written to the `sets` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSet {
    pub date: NaiveDate,
    pub exercise: Exercise,
    pub weight_kg: f64,
    pub reps: u32,
    pub set_number: u32,
    pub session_name: String,
    /// `date | session_name`. Not guaranteed unique across sessions.
    pub session_id: String,
}

/// A row of the `sets` table as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSet {
    /// Surrogate key assigned by the store
    pub id: i64,
    pub date: String,
    pub exercise: String,
    pub weight_kg: f64,
    pub reps: i64,
    pub set_number: i64,
    pub session_name: String,
    pub session_id: String,
}

/// Build the session identifier for a set.
pub fn session_id(date: NaiveDate, session_name: &str) -> String {
    format!(
        "{}{}{}",
        date.format("%Y-%m-%d"),
        SESSION_ID_SEPARATOR,
        session_name
    )
}

/// Summary of a completed ingest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Data rows read from the input file
    pub rows_read: usize,
    /// Rows written after the allow-list filter
    pub rows_loaded: usize,
    /// Stored row count per exercise, sorted by exercise name
    pub per_exercise: Vec<(String, usize)>,
}

impl IngestReport {
    /// Rows dropped by the allow-list filter.
    pub fn rows_filtered(&self) -> usize {
        self.rows_read - self.rows_loaded
    }
}

/// Errors that abort an ingest run. None of them leave the `sets` table modified.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Input file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input is missing required columns: {missing:?}. Found columns: {found:?}")]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
    },

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Invalid value at line {line}, column '{column}': {value:?} is not {expected}")]
    InvalidValue {
        line: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("After filtering to {allowed:?} there are 0 rows (of {before} read). Check exercise names in the input.")]
    NoRowsAfterFilter {
        before: usize,
        allowed: Vec<&'static str>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}
