//! Configuration management.
//!
//! Settings come from an optional TOML file, then environment variables.
//! Every key has a default, so an empty or missing file is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::AiConfig;

/// Default database filename.
const DEFAULT_DATABASE_FILENAME: &str = "letters.db";

/// Database path that selects a throwaway in-memory store.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// SQLite database file, or `:memory:`.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Largest accepted request body.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Upper bound on the single persistence insert per request.
    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,
    #[serde(default)]
    pub ai: AiConfig,
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_database_path() -> PathBuf {
    // Platform data dir -> home dir -> current dir
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docintake")
        .join(DEFAULT_DATABASE_FILENAME)
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

fn default_store_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database_path: default_database_path(),
            max_upload_bytes: default_max_upload_bytes(),
            store_timeout_secs: default_store_timeout_secs(),
            ai: AiConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    /// Parse a TOML config file without consulting the environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `DOCINTAKE_BIND`: listen address
    /// - `DATABASE_PATH`: SQLite file or `:memory:`
    /// - `DOCINTAKE_MAX_UPLOAD_BYTES`: request body limit
    /// - everything [`AiConfig::with_env_overrides`] reads
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = std::env::var("DOCINTAKE_BIND") {
            self.bind = val;
        }
        if let Ok(val) = std::env::var("DATABASE_PATH") {
            self.database_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("DOCINTAKE_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = val.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DOCINTAKE_MAX_UPLOAD_BYTES",
                value: val.clone(),
            })?;
        }
        self.ai = self.ai.with_env_overrides();
        Ok(self)
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_DATABASE
    }
}
