//! Configuration for the books catalog.
//!
//! Loaded from `$BOOKS_CONFIG` when set, otherwise `~/.books/config.toml`.
//! A missing file is not an error; every section falls back to defaults.
//!
//! ```toml
//! [database]
//! path = "${HOME}/.books/books.db"
//!
//! [simulation]
//! budget_ms = 5000
//! max_concurrency = 8
//! base_ms = 1000
//! per_title_char_ms = 50
//!
//! [logging]
//! filter = "info"
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use books_types::{DEFAULT_SIMULATION_BUDGET, InvalidRequest, budget_from_millis};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "BOOKS_CONFIG";

const DEFAULT_READING_BASE: Duration = Duration::from_millis(1000);
const DEFAULT_READING_PER_TITLE_CHAR: Duration = Duration::from_millis(50);

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BooksConfig {
    pub database: Option<DatabaseConfig>,
    pub simulation: Option<SimulationConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite file. Supports `${VAR}` expansion.
    pub path: Option<String>,
}

/// Simulated reading settings.
///
/// Budgets are signed so that a configured `0` or negative value reaches the
/// request validation and is reported instead of silently clamped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub budget_ms: Option<i64>,
    pub max_concurrency: Option<usize>,
    pub base_ms: Option<u64>,
    pub per_title_char_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

/// Reading pace resolved from config, with defaults applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceSettings {
    pub base: Duration,
    pub per_title_char: Duration,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl BooksConfig {
    /// Load from the default location. `Ok(None)` when no file exists.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Database file: configured path (env-expanded) or `~/.books/books.db`.
    #[must_use]
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database
            .as_ref()
            .and_then(|db| db.path.as_deref())
            .map(|raw| PathBuf::from(expand_env_vars(raw)))
            .or_else(default_database_path)
    }

    pub fn simulation_budget(&self) -> Result<Duration, InvalidRequest> {
        match self.simulation.as_ref().and_then(|sim| sim.budget_ms) {
            Some(ms) => budget_from_millis(ms),
            None => Ok(DEFAULT_SIMULATION_BUDGET),
        }
    }

    #[must_use]
    pub fn max_concurrency(&self) -> Option<usize> {
        self.simulation
            .as_ref()
            .and_then(|sim| sim.max_concurrency)
            .filter(|&n| n > 0)
    }

    #[must_use]
    pub fn pace(&self) -> PaceSettings {
        let sim = self.simulation.as_ref();
        PaceSettings {
            base: sim
                .and_then(|s| s.base_ms)
                .map_or(DEFAULT_READING_BASE, Duration::from_millis),
            per_title_char: sim
                .and_then(|s| s.per_title_char_ms)
                .map_or(DEFAULT_READING_PER_TITLE_CHAR, Duration::from_millis),
        }
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.filter.as_deref())
    }
}

/// `$BOOKS_CONFIG`, else `~/.books/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var(CONFIG_ENV_VAR)
        && !custom.trim().is_empty()
    {
        return Some(PathBuf::from(custom));
    }
    books_home().map(|dir| dir.join("config.toml"))
}

/// `~/.books`, home of the config file, the default database, and logs.
pub fn books_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".books"))
}

fn default_database_path() -> Option<PathBuf> {
    books_home().map(|dir| dir.join("books.db"))
}
