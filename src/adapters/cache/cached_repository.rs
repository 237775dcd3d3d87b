//! TTL-cached wrapper for any Repository.
//!
//! Caches `find` results per [`Query`] for a fixed keep-alive. One mutex
//! guards the whole map and stays held while the inner repository is queried
//! on a miss, so concurrent lookups are serialized. Expired entries are only
//! dropped when they are looked up again or when the caller asks for
//! [`CachedRepository::purge_expired`]; nothing sweeps them in the background.
//!
//! Writes pass straight through and leave cached results alone, so a `find`
//! may return data older than a write made through the same repository for
//! up to the keep-alive.

use async_trait::async_trait;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::errors::RepositoryResult;
use crate::domain::models::Query;
use crate::domain::ports::Repository;

struct CachedEntry<E> {
    created_at: Instant,
    response: Vec<E>,
}

impl<E> CachedEntry<E> {
    fn is_fresh(&self, now: Instant, keep_alive: Duration) -> bool {
        now.saturating_duration_since(self.created_at) < keep_alive
    }
}

/// Cached repository decorator.
pub struct CachedRepository<E, K, R> {
    inner: R,
    entries: Mutex<HashMap<Query, CachedEntry<E>>>,
    keep_alive: Duration,
    _key: PhantomData<fn() -> K>,
}

impl<E, K, R> CachedRepository<E, K, R>
where
    E: Clone + Send + Sync + 'static,
    K: Send + Sync + 'static,
    R: Repository<E, K>,
{
    /// Wrap `inner`, keeping each `find` result for `keep_alive`.
    pub fn new(inner: R, keep_alive: Duration) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
            keep_alive,
            _key: PhantomData,
        }
    }

    /// How long a cached result stays fresh.
    pub const fn keep_alive(&self) -> Duration {
        self.keep_alive
    }

    /// The wrapped repository.
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    /// Number of cached queries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no query is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.keep_alive));
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, remaining = entries.len(), "purged expired cache entries");
        }
        purged
    }
}

#[async_trait]
impl<E, K, R> Repository<E, K> for CachedRepository<E, K, R>
where
    E: Clone + Send + Sync + 'static,
    K: Send + Sync + 'static,
    R: Repository<E, K>,
{
    async fn create(&self, entity: E) -> RepositoryResult<E> {
        self.inner.create(entity).await
    }

    async fn create_bulk(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        self.inner.create_bulk(entities).await
    }

    async fn get(&self, id: K) -> RepositoryResult<E> {
        self.inner.get(id).await
    }

    async fn find(&self, query: &Query) -> RepositoryResult<Vec<E>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if let Some(entry) = entries.get(query) {
            if entry.is_fresh(now, self.keep_alive) {
                tracing::trace!(order = %query.order_by(), "cache hit");
                return Ok(entry.response.clone());
            }
            entries.remove(query);
            tracing::debug!(order = %query.order_by(), "evicted stale cache entry");
        }

        // Miss: the lock stays held, so other lookups wait for this call.
        let response = self.inner.find(query).await?;
        entries.insert(
            query.clone(),
            CachedEntry {
                created_at: now,
                response: response.clone(),
            },
        );
        tracing::debug!(results = response.len(), cached = entries.len(), "cache populated");
        Ok(response)
    }

    async fn find_by_ids(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        self.inner.find_by_ids(ids).await
    }

    async fn update(&self, id: K, entity: E) -> RepositoryResult<E> {
        self.inner.update(id, entity).await
    }

    async fn update_bulk(&self, ids: &[K], entity: E) -> RepositoryResult<Vec<E>> {
        self.inner.update_bulk(ids, entity).await
    }

    async fn remove(&self, id: K) -> RepositoryResult<E> {
        self.inner.remove(id).await
    }

    async fn remove_bulk(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        self.inner.remove_bulk(ids).await
    }
}
