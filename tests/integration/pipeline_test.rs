//! Integration tests for the ingest -> aggregate pipeline.
//!
//! T050: Create integration test for full e1RM pipeline
//!
//! Tests the end-to-end flow against an on-disk database:
//! 1. Ingest a set export into `sets`
//! 2. Aggregate weekly best e1RM into `weekly_e1rm`
//! 3. Failed runs leave both tables untouched

use std::io::Write;
use std::path::Path;

use liftlog::ingest::IngestError;
use liftlog::metrics::AggregateError;
use liftlog::{run_aggregate, run_ingest, Database, WeeklyMetric};
use tempfile::{NamedTempFile, TempDir};

const HEADER: &str = "date,exercise,weight_kg,reps,set_number,session_name";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

fn open_db(dir: &TempDir) -> Database {
    Database::open(&dir.path().join("data").join("training.sqlite"))
        .expect("Failed to open database")
}

fn ingest_and_aggregate(db: &mut Database, path: &Path) -> Vec<WeeklyMetric> {
    run_ingest(db, path).expect("Ingest failed");
    run_aggregate(db).expect("Aggregation failed");
    db.load_weekly_metrics().expect("Failed to load metrics")
}

#[test]
fn test_two_squat_sets_in_one_week() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&["2024-01-03,Squat,100,5,1,A", "2024-01-04,Squat,110,3,1,A"]);

    let metrics = ingest_and_aggregate(&mut db, csv.path());

    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].week_start, "2024-01-01");
    assert_eq!(metrics[0].exercise, "Squat");
    assert!((metrics[0].e1rm - 121.0).abs() < 1e-9);
}

#[test]
fn test_metric_count_matches_distinct_groups() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&[
        "2024-01-01,Squat,100,5,1,Legs",
        "2024-01-07,Squat,105,5,1,Legs",
        "2024-01-08,Squat,107.5,5,1,Legs",
        "2024-01-02,Bench Press,80,5,1,Push",
        "2024-01-02,Bench Press,82.5,3,2,Push",
        "2024-01-09,Deadlift,160,3,1,Pull",
        "2024-01-09,Farmer Walk,40,1,1,Pull",
    ]);

    let ingest = run_ingest(&mut db, csv.path()).expect("Ingest failed");
    assert_eq!(ingest.rows_read, 7);
    assert_eq!(ingest.rows_loaded, 6);

    let report = run_aggregate(&mut db).expect("Aggregation failed");
    assert_eq!(report.rows_read, 6);
    assert_eq!(report.metrics_written, 4);
    assert_eq!(db.count_weekly_metrics().unwrap(), 4);

    let keys: Vec<_> = db
        .load_weekly_metrics()
        .unwrap()
        .into_iter()
        .map(|m| (m.week_start, m.exercise))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2024-01-01".to_string(), "Bench Press".to_string()),
            ("2024-01-01".to_string(), "Squat".to_string()),
            ("2024-01-08".to_string(), "Deadlift".to_string()),
            ("2024-01-08".to_string(), "Squat".to_string()),
        ]
    );
}

#[test]
fn test_reruns_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&[
        "2024-01-03,Squat,100,5,1,A",
        "2024-01-03,Squat,100,5,2,A",
        "2024-01-05,Deadlift,150,3,1,B",
    ]);

    run_ingest(&mut db, csv.path()).unwrap();
    let sets_first = db.load_sets().unwrap();
    run_ingest(&mut db, csv.path()).unwrap();
    let sets_second = db.load_sets().unwrap();
    assert_eq!(sets_first, sets_second);

    run_aggregate(&mut db).unwrap();
    let metrics_first = db.load_weekly_metrics().unwrap();
    run_aggregate(&mut db).unwrap();
    let metrics_second = db.load_weekly_metrics().unwrap();
    assert_eq!(metrics_first, metrics_second);
    for (a, b) in metrics_first.iter().zip(&metrics_second) {
        assert_eq!(a.e1rm.to_bits(), b.e1rm.to_bits());
    }
}

#[test]
fn test_missing_reps_column_leaves_sets_unchanged() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let good = write_csv(&["2024-01-03,Squat,100,5,1,A"]);
    run_ingest(&mut db, good.path()).unwrap();
    let before = db.load_sets().unwrap();

    let mut bad = NamedTempFile::new().unwrap();
    writeln!(bad, "date,exercise,weight_kg,set_number,session_name").unwrap();
    writeln!(bad, "2024-01-10,Deadlift,200,1,B").unwrap();

    match run_ingest(&mut db, bad.path()) {
        Err(IngestError::MissingColumns { missing, found }) => {
            assert_eq!(missing, vec!["reps".to_string()]);
            assert!(found.contains(&"set_number".to_string()));
        }
        other => panic!("Expected MissingColumns, got {:?}", other),
    }
    assert_eq!(db.load_sets().unwrap(), before);
}

#[test]
fn test_bad_value_anywhere_rejects_whole_file() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let good = write_csv(&["2024-01-03,Squat,100,5,1,A"]);
    run_ingest(&mut db, good.path()).unwrap();

    let bad = write_csv(&[
        "2024-01-10,Squat,120,5,1,A",
        "2024-01-10,Squat,120,5,2,A",
        "2024-01-10,Squat,heavy,5,3,A",
    ]);
    let result = run_ingest(&mut db, bad.path());
    assert!(matches!(
        result,
        Err(IngestError::InvalidValue {
            line: 4,
            column: "weight_kg",
            ..
        })
    ));
    assert_eq!(db.count_sets().unwrap(), 1);
}

#[test]
fn test_extreme_date_rejected_at_ingest() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let good = write_csv(&["2024-01-03,Squat,100,5,1,A"]);
    let before = ingest_and_aggregate(&mut db, good.path());

    let bad = write_csv(&["-262143-01-01,Squat,100,5,1,A"]);
    assert!(matches!(
        run_ingest(&mut db, bad.path()),
        Err(IngestError::InvalidValue {
            line: 2,
            column: "date",
            ..
        })
    ));
    assert_eq!(db.count_sets().unwrap(), 1);

    run_aggregate(&mut db).expect("Aggregation failed");
    assert_eq!(db.load_weekly_metrics().unwrap(), before);
}

#[test]
fn test_text_after_quoted_field_rejects_file() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&["2024-01-03,\"Squat\"x,100,5,1,A"]);

    assert!(matches!(
        run_ingest(&mut db, csv.path()),
        Err(IngestError::Malformed { line: 2, .. })
    ));
    assert_eq!(db.count_sets().unwrap(), 0);
}

#[test]
fn test_only_yoga_fails_after_filter() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&["2024-01-03,Yoga,0,1,1,Morning", "2024-01-04,Yoga,0,1,1,Morning"]);

    match run_ingest(&mut db, csv.path()) {
        Err(IngestError::NoRowsAfterFilter { before, allowed }) => {
            assert_eq!(before, 2);
            assert_eq!(allowed, vec!["Bench Press", "Deadlift", "Squat"]);
        }
        other => panic!("Expected NoRowsAfterFilter, got {:?}", other),
    }
    assert_eq!(db.count_sets().unwrap(), 0);
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);

    let result = run_ingest(&mut db, &dir.path().join("raw").join("missing.csv"));
    assert!(matches!(result, Err(IngestError::SourceNotFound(_))));
}

#[test]
fn test_empty_sets_yield_empty_metrics() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    db.replace_weekly_metrics(&[WeeklyMetric {
        week_start: "2023-12-25".to_string(),
        exercise: "Squat".to_string(),
        e1rm: 100.0,
    }])
    .unwrap();

    let report = run_aggregate(&mut db).expect("Aggregation failed");
    assert_eq!(report.rows_read, 0);
    assert_eq!(report.metrics_written, 0);
    assert_eq!(db.count_weekly_metrics().unwrap(), 0);
}

#[test]
fn test_tampered_date_aborts_aggregation() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&["2024-01-03,Squat,100,5,1,A", "2024-01-04,Squat,110,3,1,A"]);
    let before = ingest_and_aggregate(&mut db, csv.path());

    db.connection()
        .execute("UPDATE sets SET date = 'someday' WHERE id = 2", [])
        .unwrap();

    match run_aggregate(&mut db) {
        Err(AggregateError::InvalidDate { id, value }) => {
            assert_eq!(id, 2);
            assert_eq!(value, "someday");
        }
        other => panic!("Expected InvalidDate, got {:?}", other),
    }
    assert_eq!(db.load_weekly_metrics().unwrap(), before);
}

#[test]
fn test_tampered_exercise_is_still_aggregated() {
    let dir = TempDir::new().unwrap();
    let mut db = open_db(&dir);
    let csv = write_csv(&["2024-01-03,Squat,100,5,1,A"]);
    run_ingest(&mut db, csv.path()).unwrap();

    db.connection()
        .execute("UPDATE sets SET exercise = 'Front Squat' WHERE id = 1", [])
        .unwrap();

    run_aggregate(&mut db).unwrap();
    let metrics = db.load_weekly_metrics().unwrap();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].exercise, "Front Squat");
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let csv = write_csv(&["2024-01-03,Bench Press,80,8,1,Push"]);

    {
        let mut db = open_db(&dir);
        ingest_and_aggregate(&mut db, csv.path());
    }

    let db = open_db(&dir);
    assert_eq!(db.count_sets().unwrap(), 1);
    let metrics = db.load_weekly_metrics().unwrap();
    assert_eq!(metrics[0].exercise, "Bench Press");
    assert!((metrics[0].e1rm - 80.0 * (1.0 + 8.0 / 30.0)).abs() < 1e-9);
}
