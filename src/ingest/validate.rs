//! Column and type validation for raw set rows.
//!
//! T021: Implement required-column check and strict type coercion
//!
//! Validation is all-or-nothing: the first value that cannot be coerced
//! aborts the whole batch.

use crate::ingest::table::{Record, Table};
use crate::ingest::types::{IngestError, REQUIRED_COLUMNS};
use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// A row projected to the required columns and coerced to typed values.
///
/// `exercise` is trimmed but not yet checked against the allow-list.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    pub date: NaiveDate,
    pub exercise: String,
    pub weight_kg: f64,
    pub reps: u32,
    pub set_number: u32,
    pub session_name: String,
}

/// Indices of the required columns within a table, in canonical order.
#[derive(Debug, Clone, Copy)]
pub struct ColumnMap([usize; 6]);

impl ColumnMap {
    /// Locate every required column, or report which are missing.
    pub fn resolve(table: &Table) -> Result<Self, IngestError> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| table.column_index(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(IngestError::MissingColumns {
                missing,
                found: table.headers.clone(),
            });
        }

        let mut indices = [0usize; 6];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
            *slot = table.column_index(name).unwrap_or_default();
        }

        Ok(Self(indices))
    }

    /// Project a record onto the required columns, dropping extras.
    fn project<'r>(&self, record: &'r Record) -> [&'r str; 6] {
        self.0.map(|i| record.fields[i].as_str())
    }
}

/// Coerce every record of the table. Fails on the first bad value.
pub fn coerce_table(table: &Table) -> Result<Vec<TypedRow>, IngestError> {
    let columns = ColumnMap::resolve(table)?;

    table
        .records
        .iter()
        .map(|record| coerce_record(&columns, record))
        .collect()
}

fn coerce_record(columns: &ColumnMap, record: &Record) -> Result<TypedRow, IngestError> {
    let [date, exercise, weight_kg, reps, set_number, session_name] = columns.project(record);
    let line = record.line;

    let session_name = session_name.trim();
    if session_name.is_empty() {
        return Err(invalid(line, "session_name", session_name, "a non-empty name"));
    }

    Ok(TypedRow {
        date: parse_date(date).ok_or_else(|| invalid(line, "date", date, "a calendar date"))?,
        exercise: exercise.trim().to_string(),
        weight_kg: parse_weight(weight_kg)
            .ok_or_else(|| invalid(line, "weight_kg", weight_kg, "a non-negative number"))?,
        reps: parse_count(reps).ok_or_else(|| invalid(line, "reps", reps, "a positive integer"))?,
        set_number: parse_count(set_number)
            .ok_or_else(|| invalid(line, "set_number", set_number, "a positive integer"))?,
        session_name: session_name.to_string(),
    })
}

fn invalid(line: usize, column: &'static str, value: &str, expected: &'static str) -> IngestError {
    IngestError::InvalidValue {
        line,
        column,
        value: value.to_string(),
        expected,
    }
}

/// Date-time layouts seen in workout log exports. Only the date part is kept.
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Years a stored date may carry. Outside this range `YYYY-MM-DD` no longer
/// round-trips and week arithmetic can leave chrono's supported range.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Parse a calendar date, accepting plain dates and date-times.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|dt| dt.date())
        })
        .filter(|date| YEAR_RANGE.contains(&date.year()))
}

/// Parse a finite, non-negative weight in kilograms.
pub fn parse_weight(value: &str) -> Option<f64> {
    let weight: f64 = value.trim().parse().ok()?;
    (weight.is_finite() && weight >= 0.0).then_some(weight)
}

/// Parse a positive integer count. Integral decimals such as `5.0` are accepted.
pub fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();

    if let Ok(n) = value.parse::<u32>() {
        return (n >= 1).then_some(n);
    }

    let n: f64 = value.parse().ok()?;
    if n.fract() == 0.0 && (1.0..=u32::MAX as f64).contains(&n) {
        Some(n as u32)
    } else {
        None
    }
}
