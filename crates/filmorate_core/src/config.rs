//! Core configuration.
//!
//! # Responsibility
//! - Describe which storage backend a process runs with and where logs go.
//! - Read that description from the environment for simple hosts.
//!
//! # Invariants
//! - Missing settings fall back to the in-memory backend and the build's
//!   default log level; invalid settings are errors, never silently ignored.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_STORAGE: &str = "FILMORATE_STORAGE";
pub const ENV_DB_PATH: &str = "FILMORATE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "FILMORATE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "FILMORATE_LOG_DIR";

/// Storage backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StorageConfig {
    /// Volatile process-local maps.
    #[default]
    Memory,
    /// SQLite database file, created and migrated on open.
    Sqlite { path: PathBuf },
}

impl StorageConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Sqlite { .. } => "sqlite",
        }
    }
}

/// Process-level settings for the catalog core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            log_level: default_level_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `FILMORATE_STORAGE` holds something other than `memory` or `sqlite`.
    UnknownBackend(String),
    /// SQLite was selected without `FILMORATE_DB_PATH`.
    MissingDbPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(value) => write!(
                f,
                "unsupported storage backend `{value}`; expected memory|sqlite"
            ),
            Self::MissingDbPath => write!(f, "{ENV_DB_PATH} is required for sqlite storage"),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Reads configuration from `FILMORATE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let storage = match read(ENV_STORAGE)
            .map(|value| value.to_ascii_lowercase())
            .as_deref()
        {
            None | Some("memory") => StorageConfig::Memory,
            Some("sqlite") => StorageConfig::Sqlite {
                path: read(ENV_DB_PATH)
                    .map(PathBuf::from)
                    .ok_or(ConfigError::MissingDbPath)?,
            },
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        Ok(Self {
            storage,
            log_level: read(ENV_LOG_LEVEL).unwrap_or_else(default_level_string),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

fn default_level_string() -> String {
    default_log_level().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_selects_memory_backend() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn sqlite_backend_reads_db_path() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_STORAGE, " SQLite "),
            (ENV_DB_PATH, "/tmp/catalog.db"),
            (ENV_LOG_LEVEL, "warn"),
        ]))
        .unwrap();
        assert_eq!(
            config.storage,
            StorageConfig::Sqlite {
                path: PathBuf::from("/tmp/catalog.db")
            }
        );
        assert_eq!(config.storage.backend_name(), "sqlite");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn sqlite_without_path_is_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_STORAGE, "sqlite")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingDbPath);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_STORAGE, "postgres")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownBackend("postgres".to_string()));
    }
}
