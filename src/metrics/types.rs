//! Strength metric types.
//!
//! T030: Define SetRecord / WeeklyMetric structs
//! T031: Define AggregateError enum

use crate::storage::database::DatabaseError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The columns of a stored set that the weekly aggregation reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub id: i64,
    pub date: String,
    pub exercise: String,
    pub weight_kg: f64,
    pub reps: i64,
}

/// Best estimated one-rep max for one exercise in one Monday-aligned week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMetric {
    /// Monday of the week, `YYYY-MM-DD`
    pub week_start: String,
    pub exercise: String,
    pub e1rm: f64,
}

/// Summary of a completed aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Set rows read from the store
    pub rows_read: usize,
    /// Weekly metric rows written
    pub metrics_written: usize,
}

/// Errors that abort an aggregation run before `weekly_e1rm` is modified.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Set {id} has an unparseable date: {value:?}")]
    InvalidDate { id: i64, value: String },

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Result type for aggregation operations.
pub type AggregateResult<T> = Result<T, AggregateError>;
