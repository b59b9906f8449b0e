//! Core runtime configuration handed over by the host app.
//!
//! # Invariants
//! - `db_path` and `log_dir` (when set) are absolute paths.
//! - `log_level` is normalized to `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidPath { field: &'static str, value: String },
    InvalidLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "config is not valid JSON: {err}"),
            Self::InvalidPath { field, value } => {
                write!(f, "{field} must be a non-empty absolute path, got `{value}`")
            }
            Self::InvalidLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    db_path: String,
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    log_dir: Option<String>,
}

/// Validated core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Parses and validates a JSON config such as
    /// `{"dbPath": "/data/habitflow.sqlite3", "logLevel": "info", "logDir": "/data/logs"}`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        let log_level = match raw.log_level.as_deref() {
            Some(level) => normalize_level(level).map_err(ConfigError::InvalidLevel)?,
            None => default_log_level(),
        };
        let log_dir = raw
            .log_dir
            .as_deref()
            .map(|dir| absolute_path("logDir", dir))
            .transpose()?;

        Ok(Self {
            db_path: absolute_path("dbPath", &raw.db_path)?,
            log_level,
            log_dir,
        })
    }
}

fn absolute_path(field: &'static str, value: &str) -> Result<PathBuf, ConfigError> {
    let trimmed = value.trim();
    let path = Path::new(trimmed);
    if trimmed.is_empty() || !path.is_absolute() {
        return Err(ConfigError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
    Ok(path.to_path_buf())
}
