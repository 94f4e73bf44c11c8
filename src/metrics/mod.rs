//! Derived strength metrics.
//!
//! - Epley estimated one-rep max (e1RM) per set
//! - Monday-aligned week buckets
//! - Weekly best e1RM per exercise

pub mod e1rm;
pub mod report;
pub mod types;
pub mod weekly;

pub use e1rm::{epley_e1rm, week_start};
pub use types::{AggregateError, AggregateReport, AggregateResult, SetRecord, WeeklyMetric};
pub use weekly::{run_aggregate, weekly_maxima};
