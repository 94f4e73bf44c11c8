//! LiftLog - Strength Training Log
//!
//! Command-line entry point. Each command opens the database, runs one job,
//! and closes it again. Running commands concurrently against the same
//! database is unsupported.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use liftlog::metrics::report::{render_json, render_table};
use liftlog::storage::config::{get_data_dir, load_config, load_config_from};
use liftlog::{run_aggregate, run_ingest, AppConfig, Database};

/// Ingest strength-training sets and compute weekly estimated one-rep max.
#[derive(Parser, Debug)]
#[command(name = "liftlog", version, about)]
struct Cli {
    /// Path to a config.toml (defaults to the platform data directory).
    #[arg(long, global = true, env = "LIFTLOG_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database path, overriding the config.
    #[arg(long, global = true, env = "LIFTLOG_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a set export into the `sets` table, replacing its contents.
    Ingest {
        /// Input CSV file, overriding the config.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Recompute `weekly_e1rm` from the `sets` table.
    Aggregate,
    /// Ingest, then aggregate.
    Run {
        /// Input CSV file, overriding the config.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the stored weekly e1RM table.
    Report {
        /// Emit JSON instead of a text table.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config_from(path, get_data_dir())
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => load_config().context("loading config")?,
    };
    if let Some(database) = &cli.database {
        config.database_path = database.clone();
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting LiftLog v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Ingest { input } => ingest(&config, input),
        Command::Aggregate => aggregate(&config),
        Command::Run { input } => {
            ingest(&config, input)?;
            aggregate(&config)
        }
        Command::Report { json } => report(&config, json),
    }
}

fn open_database(config: &AppConfig) -> anyhow::Result<Database> {
    Database::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path.display()))
}

fn ingest(config: &AppConfig, input: Option<PathBuf>) -> anyhow::Result<()> {
    let input = input.unwrap_or_else(|| config.input_path.clone());
    let mut db = open_database(config)?;

    let report = run_ingest(&mut db, &input)
        .with_context(|| format!("ingesting {}", input.display()))?;

    tracing::info!(
        rows_read = report.rows_read,
        rows_loaded = report.rows_loaded,
        rows_filtered = report.rows_filtered(),
        "Ingest complete"
    );
    Ok(())
}

fn aggregate(config: &AppConfig) -> anyhow::Result<()> {
    let mut db = open_database(config)?;

    let report = run_aggregate(&mut db).context("computing weekly e1RM")?;

    tracing::info!(
        rows_read = report.rows_read,
        metrics_written = report.metrics_written,
        "Aggregation complete"
    );
    Ok(())
}

fn report(config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let db = open_database(config)?;
    let metrics = db.load_weekly_metrics().context("reading weekly_e1rm")?;

    if json {
        println!("{}", render_json(&metrics)?);
    } else {
        print!("{}", render_table(&metrics));
    }
    Ok(())
}
