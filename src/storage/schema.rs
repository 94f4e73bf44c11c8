//! Database schema definitions for LiftLog.
//!
//! T008: Define database schema SQL

/// SQL for the raw sets table, one row per recorded lift attempt.
///
/// `session_id` is derived from date and session name and is not unique-safe,
/// so it is deliberately left without a UNIQUE constraint.
pub const SETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS sets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    exercise TEXT NOT NULL,
    weight_kg REAL NOT NULL,
    reps INTEGER NOT NULL,
    set_number INTEGER NOT NULL,
    session_name TEXT NOT NULL,
    session_id TEXT NOT NULL
);
"#;

/// SQL for the derived weekly e1RM table.
pub const WEEKLY_E1RM_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weekly_e1rm (
    week_start TEXT NOT NULL,
    exercise TEXT NOT NULL,
    e1rm REAL NOT NULL,
    PRIMARY KEY (week_start, exercise)
);
"#;

/// SQL schema version tracking table.
///
/// Written only by migrations; the ingest and aggregate jobs never touch it.
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
