//! Repository implementations: one per backend, plus the caching decorator.
//!
//! The constructors below return type-erased repositories so callers can
//! pick a backend at wiring time and hold the same `Arc<dyn Repository>`
//! regardless of which one they chose.

pub mod cache;
pub mod document;
pub mod sqlite;

use mongodb::Database;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::ports::Repository;
use cache::CachedRepository;
use document::DocumentRepository;
use sqlite::{SqlEntity, SqlKey, SqlRepository};

/// Repository over the SQLite table described by `E`.
pub fn new_sql_repository<E, K>(pool: SqlitePool) -> Arc<dyn Repository<E, K>>
where
    E: SqlEntity,
    K: SqlKey,
{
    Arc::new(SqlRepository::<E, K>::new(pool))
}

/// Repository over a MongoDB collection.
pub fn new_document_repository<E, K>(database: &Database, collection: &str) -> Arc<dyn Repository<E, K>>
where
    E: Serialize + DeserializeOwned + Send + Sync + 'static,
    K: Serialize + Display + Send + Sync + 'static,
{
    Arc::new(DocumentRepository::<E, K>::new(database, collection))
}

/// Wrap `inner` so `find` results are kept for `keep_alive`.
pub fn with_local_cache<E, K>(inner: Arc<dyn Repository<E, K>>, keep_alive: Duration) -> Arc<dyn Repository<E, K>>
where
    E: Clone + Send + Sync + 'static,
    K: Send + Sync + 'static,
{
    Arc::new(CachedRepository::new(inner, keep_alive))
}
