//! Ingest job: raw export file -> `sets` table.
//!
//! T022: Implement the ingest pipeline (load, validate, filter, replace)

use crate::ingest::table::Table;
use crate::ingest::types::{session_id, Exercise, IngestError, IngestReport, NewSet};
use crate::ingest::validate::{coerce_table, TypedRow};
use crate::storage::database::Database;
use std::path::Path;

/// Read, validate, and filter an input file without touching the store.
pub fn prepare_sets(path: &Path) -> Result<(usize, Vec<NewSet>), IngestError> {
    if !path.is_file() {
        return Err(IngestError::SourceNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let table = Table::parse(&content)?;
    tracing::info!("Read {} rows from {}", table.len(), path.display());

    let rows = coerce_table(&table)?;
    let before = rows.len();
    let sets = filter_allowed(rows);

    if sets.is_empty() {
        return Err(IngestError::NoRowsAfterFilter {
            before,
            allowed: Exercise::allowed_names(),
        });
    }
    if sets.len() != before {
        tracing::info!(
            "Filtered rows: {} -> {} (kept only {:?})",
            before,
            sets.len(),
            Exercise::allowed_names()
        );
    }

    for set in sets.iter().take(5) {
        tracing::debug!(
            date = %set.date,
            exercise = %set.exercise,
            weight_kg = set.weight_kg,
            reps = set.reps,
            session_id = %set.session_id,
            "Prepared set"
        );
    }

    Ok((before, sets))
}

/// Keep allow-listed exercises and attach the derived session id.
pub fn filter_allowed(rows: Vec<TypedRow>) -> Vec<NewSet> {
    rows.into_iter()
        .filter_map(|row| {
            let exercise = Exercise::parse(&row.exercise)?;
            Some(NewSet {
                session_id: session_id(row.date, &row.session_name),
                date: row.date,
                exercise,
                weight_kg: row.weight_kg,
                reps: row.reps,
                set_number: row.set_number,
                session_name: row.session_name,
            })
        })
        .collect()
}

/// Run the full ingest: every validation happens before the single
/// transactional replace of the `sets` table.
pub fn run_ingest(db: &mut Database, path: &Path) -> Result<IngestReport, IngestError> {
    let (rows_read, sets) = prepare_sets(path)?;

    let rows_loaded = db.replace_sets(&sets)?;
    tracing::info!("Loaded {} set rows into {}", rows_loaded, db.location());

    let per_exercise = db.count_sets_by_exercise()?;
    tracing::info!(
        "Counts by exercise: {:?} ({} groups)",
        per_exercise,
        per_exercise.len()
    );

    Ok(IngestReport {
        rows_read,
        rows_loaded,
        per_exercise,
    })
}
