//! Ingest of raw strength-training sets.
//!
//! Reads a set export, validates structure and types, keeps only the tracked
//! lifts, and replaces the contents of the `sets` table.

pub mod ingestor;
pub mod table;
pub mod types;
pub mod validate;

pub use ingestor::{prepare_sets, run_ingest};
pub use table::Table;
pub use types::{Exercise, IngestError, IngestReport, NewSet, RawSet, REQUIRED_COLUMNS};
