//! Jaguar - backend-agnostic repository layer
//!
//! One CRUD contract, [`Repository`], with interchangeable implementations:
//!
//! - **SQLite** ([`adapters::sqlite`]): translates a [`Query`] into bounded
//!   SQL clauses and runs it through `sqlx`.
//! - **MongoDB** ([`adapters::document`]): translates a [`Query`] into find
//!   options on a document collection.
//! - **Local cache** ([`adapters::cache`]): wraps any repository and keeps
//!   `find` results per query for a fixed time-to-live.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): the query model, the repository port, errors
//! - **Adapters** (`adapters`): one `Repository` implementation per backend
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//!
//! # Example
//!
//! ```ignore
//! use jaguar::{new_sql_repository, with_local_cache, OrderBy, Page, Query};
//! use std::time::Duration;
//!
//! let people = with_local_cache(new_sql_repository::<Person, i64>(pool), Duration::from_secs(5));
//! let query = Query::new()
//!     .with_page(Page::new(1, 20))
//!     .with_order_by(OrderBy::asc("last_name"));
//! let first_page = people.find(&query).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::cache::CachedRepository;
pub use adapters::document::DocumentRepository;
pub use adapters::sqlite::{SqlEntity, SqlKey, SqlRepository, Value};
pub use adapters::{new_document_repository, new_sql_repository, with_local_cache};
pub use domain::errors::{RepositoryError, RepositoryResult};
pub use domain::models::{
    CacheConfig, Config, DatabaseConfig, DocumentStoreConfig, LoggingConfig, OrderBy, Page, Query,
};
pub use domain::ports::Repository;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::LoggerImpl;
