//! Figment-backed configuration loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Prefix of environment variable overrides, e.g. `JAGUAR_CACHE__KEEP_ALIVE_MS`.
pub const ENV_PREFIX: &str = "JAGUAR_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The database URL is blank.
    #[error("Database URL cannot be empty")]
    EmptyDatabaseUrl,

    /// The pool allows no connections.
    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    /// More idle connections than the pool may open.
    #[error("Invalid min_connections: {min}. Must not exceed max_connections ({max})")]
    InvalidMinConnections {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The document store URI is blank.
    #[error("Document store URI cannot be empty")]
    EmptyDocumentUri,

    /// The document store database name is blank.
    #[error("Document store database name cannot be empty")]
    EmptyDocumentDatabase,

    /// The cache keep-alive is zero.
    #[error("Invalid keep_alive_ms: {0}. Must be positive")]
    InvalidKeepAlive(u64),

    /// Unknown log level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Unknown log format.
    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    /// Unknown log rotation.
    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. jaguar.yaml
    /// 3. jaguar.local.yaml (optional local overrides)
    /// 4. Environment variables (JAGUAR_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file("jaguar.yaml"))
            .merge(Yaml::file("jaguar.local.yaml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let database = &config.database;
        if database.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(database.max_connections));
        }
        if database.min_connections > database.max_connections {
            return Err(ConfigError::InvalidMinConnections {
                min: database.min_connections,
                max: database.max_connections,
            });
        }

        if config.document.uri.trim().is_empty() {
            return Err(ConfigError::EmptyDocumentUri);
        }
        if config.document.database.trim().is_empty() {
            return Err(ConfigError::EmptyDocumentDatabase);
        }

        if config.cache.keep_alive_ms == 0 {
            return Err(ConfigError::InvalidKeepAlive(config.cache.keep_alive_ms));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
