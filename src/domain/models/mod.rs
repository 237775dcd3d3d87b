//! Domain models: the query descriptor and application configuration.

pub mod config;
pub mod query;

pub use config::{CacheConfig, Config, DatabaseConfig, DocumentStoreConfig, LoggingConfig};
pub use query::{OrderBy, Page, Query};
