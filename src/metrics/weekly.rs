//! Weekly best e1RM per exercise.
//!
//! T032: Implement weekly max reduction
//! T033: Implement aggregation job with transactional replace

use std::collections::BTreeMap;

use crate::metrics::e1rm::{epley_e1rm, format_date, parse_stored_date, week_start};
use crate::metrics::types::{AggregateError, AggregateReport, AggregateResult, SetRecord, WeeklyMetric};
use crate::storage::database::Database;

/// Reduce sets to the maximum e1RM per (week_start, exercise).
///
/// Output is sorted by week_start, then exercise. Exercise membership is not
/// re-checked here; whatever is stored gets aggregated.
pub fn weekly_maxima(sets: &[SetRecord]) -> AggregateResult<Vec<WeeklyMetric>> {
    let mut best: BTreeMap<(String, String), f64> = BTreeMap::new();

    for set in sets {
        let week = parse_stored_date(&set.date)
            .and_then(week_start)
            .map(format_date)
            .ok_or_else(|| AggregateError::InvalidDate {
                id: set.id,
                value: set.date.clone(),
            })?;
        let e1rm = epley_e1rm(set.weight_kg, set.reps);

        tracing::debug!(date = %set.date, week_start = %week, e1rm, "Bucketed set");

        best.entry((week, set.exercise.clone()))
            .and_modify(|current| *current = current.max(e1rm))
            .or_insert(e1rm);
    }

    Ok(best
        .into_iter()
        .map(|((week_start, exercise), e1rm)| WeeklyMetric {
            week_start,
            exercise,
            e1rm,
        })
        .collect())
}

/// Recompute `weekly_e1rm` from the current contents of `sets`.
pub fn run_aggregate(db: &mut Database) -> AggregateResult<AggregateReport> {
    let sets = db.load_set_records()?;
    tracing::info!("Rows pulled from DB: {}", sets.len());

    let metrics = weekly_maxima(&sets)?;
    for metric in &metrics {
        tracing::debug!(
            week_start = %metric.week_start,
            exercise = %metric.exercise,
            e1rm = metric.e1rm,
            "Weekly max e1RM"
        );
    }

    let metrics_written = db.replace_weekly_metrics(&metrics)?;
    tracing::info!("Saved rows in weekly_e1rm: {}", metrics_written);

    Ok(AggregateReport {
        rows_read: sets.len(),
        metrics_written,
    })
}
