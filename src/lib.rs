//! LiftLog - Strength Training Log
//!
//! Ingests raw strength-training sets (date, exercise, weight, reps) from a
//! CSV export into SQLite and derives the weekly best estimated one-rep max
//! (Epley e1RM) per exercise.
//!
//! The two jobs share one database and must run in order: [`ingest::run_ingest`]
//! replaces the `sets` table, then [`metrics::run_aggregate`] replaces
//! `weekly_e1rm` from it.

pub mod ingest;
pub mod metrics;
pub mod storage;

// Re-export commonly used types
pub use ingest::{run_ingest, Exercise, IngestError, IngestReport};
pub use metrics::{run_aggregate, AggregateError, AggregateReport, WeeklyMetric};
pub use storage::{AppConfig, Database, DatabaseError};
