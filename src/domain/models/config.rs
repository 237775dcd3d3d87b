//! Application configuration sections.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Relational database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Document store configuration
    #[serde(default)]
    pub document: DocumentStoreConfig,

    /// Query cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relational database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// `SQLite` connection URL, e.g. `sqlite:data/jaguar.db`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite:jaguar.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_min_connections() -> u32 {
    1
}

const fn default_acquire_timeout_secs() -> u64 {
    3
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DocumentStoreConfig {
    /// `MongoDB` connection string
    #[serde(default = "default_document_uri")]
    pub uri: String,

    /// Database holding the collections
    #[serde(default = "default_document_database")]
    pub database: String,
}

fn default_document_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_document_database() -> String {
    "jaguar".to_string()
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            uri: default_document_uri(),
            database: default_document_database(),
        }
    }
}

/// Query cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// How long a cached `find` result stays valid, in milliseconds
    #[serde(default = "default_keep_alive_ms")]
    pub keep_alive_ms: u64,
}

const fn default_keep_alive_ms() -> u64 {
    30_000
}

impl CacheConfig {
    /// Keep-alive as a [`Duration`].
    pub const fn keep_alive(&self) -> Duration {
        Duration::from_millis(self.keep_alive_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_alive_ms: default_keep_alive_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stdout only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
