//! Text and JSON rendering of weekly e1RM results.

use crate::metrics::types::WeeklyMetric;

/// Render weekly metrics as an aligned plain-text table.
pub fn render_table(metrics: &[WeeklyMetric]) -> String {
    let exercise_width = metrics
        .iter()
        .map(|m| m.exercise.len())
        .max()
        .unwrap_or(0)
        .max("exercise".len());

    let mut output = format!(
        "{:<10}  {:<width$}  {:>8}\n",
        "week_start",
        "exercise",
        "e1rm",
        width = exercise_width
    );
    for metric in metrics {
        output.push_str(&format!(
            "{:<10}  {:<width$}  {:>8.1}\n",
            metric.week_start,
            metric.exercise,
            metric.e1rm,
            width = exercise_width
        ));
    }

    output
}

/// Render weekly metrics as pretty-printed JSON.
pub fn render_json(metrics: &[WeeklyMetric]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(metrics)
}
