//! Application configuration.
//!
//! T010: Implement Config loading from TOML

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the raw export expected under `<data_dir>/raw/`.
pub const DEFAULT_INPUT_FILE: &str = "strong_sets_initial.csv";

/// File name of the SQLite store under `<data_dir>/`.
pub const DEFAULT_DATABASE_FILE: &str = "training.sqlite";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Raw sets file consumed by the ingestor
    pub input_path: PathBuf,
    /// SQLite database shared by both jobs
    pub database_path: PathBuf,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_data_dir(PathBuf::new())
    }
}

impl AppConfig {
    /// Build the default layout rooted at `data_dir`.
    pub fn for_data_dir(data_dir: PathBuf) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_path: data_dir.join("raw").join(DEFAULT_INPUT_FILE),
            database_path: data_dir.join(DEFAULT_DATABASE_FILE),
            data_dir,
            logging: LoggingSettings::default(),
        }
    }

    /// Resolve relative paths against the data directory.
    fn resolve_paths(&mut self) {
        if self.input_path.is_relative() {
            self.input_path = self.data_dir.join(&self.input_path);
        }
        if self.database_path.is_relative() {
            self.database_path = self.data_dir.join(&self.database_path);
        }
    }
}

/// Logging-related settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "liftlog", "LiftLog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = get_config_path();

    if !path.exists() {
        return Ok(AppConfig::for_data_dir(get_data_dir()));
    }

    load_config_from(&path, get_data_dir())
}

/// Load application configuration from an explicit file.
///
/// Relative `input_path` and `database_path` values are resolved against `data_dir`.
pub fn load_config_from(path: &Path, data_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    parse_config(&content, data_dir)
}

fn parse_config(content: &str, data_dir: PathBuf) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = data_dir;
    config.resolve_paths();

    Ok(config)
}

/// Save application configuration to file.
pub fn save_config(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
