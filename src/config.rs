//! Configuration module for mediatree.

use serde::Deserialize;
use std::path::Path;

use crate::{MediaTreeError, Result};

/// Remote object store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the object store API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for authenticating against the store.
    #[serde(default)]
    pub token: String,
    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Per-request read timeout in seconds.
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_read_timeout() -> u64 {
    20
}

fn default_total_timeout() -> u64 {
    60
}

fn default_max_redirects() -> usize {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            total_timeout_secs: default_total_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Database configuration for the folder registry.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/mediatree.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Library configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    /// Top-level prefix scoping all paths of this instance.
    #[serde(default = "default_namespace_root")]
    pub namespace_root: String,
}

fn default_namespace_root() -> String {
    "app".to_string()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            namespace_root: default_namespace_root(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/mediatree.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Remote object store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Folder registry database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Library settings.
    #[serde(default)]
    pub library: LibraryConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MediaTreeError::Config(e.to_string()))
    }
}
