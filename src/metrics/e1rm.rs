//! Estimated one-rep max and week bucketing.
//!
//! Implements the Epley estimate:
//! - e1RM = weight × (1 + reps / 30)
//!
//! and the Monday-aligned week used as the aggregation bucket.

use chrono::{Datelike, Days, NaiveDate};

/// Date format used for stored dates and week starts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Epley estimated one-rep max from the raw weight and rep count.
pub fn epley_e1rm(weight_kg: f64, reps: i64) -> f64 {
    weight_kg * (1.0 + reps as f64 / 30.0)
}

/// Monday of the ISO week containing `date`. Never later than `date`.
///
/// Returns `None` when that Monday falls before the earliest date chrono can
/// represent.
pub fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}

/// Parse a stored `YYYY-MM-DD` date.
pub fn parse_stored_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Format a date the way it is stored.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
