//! Repository port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::RepositoryResult;
use crate::domain::models::Query;

/// CRUD over a single entity collection, independent of the backing store.
///
/// `E` is the entity model and `K` its primary key. Implementations issue one
/// round trip per call, except where a bulk operation re-reads its result.
/// Driver errors are returned unchanged.
#[async_trait]
pub trait Repository<E, K>: Send + Sync
where
    E: Send + 'static,
    K: Send + Sync + 'static,
{
    /// Persist an entity and return it with any backend-assigned identity.
    async fn create(&self, entity: E) -> RepositoryResult<E>;

    /// Persist a set of entities. Returns one entity per input.
    async fn create_bulk(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>>;

    /// Fetch an entity by id. Fails with `NotFound` if it does not exist.
    async fn get(&self, id: K) -> RepositoryResult<E>;

    /// Fetch the entities selected by `query`. Empty when nothing matches.
    async fn find(&self, query: &Query) -> RepositoryResult<Vec<E>>;

    /// Fetch the entities with the given ids. Empty when nothing matches.
    async fn find_by_ids(&self, ids: &[K]) -> RepositoryResult<Vec<E>>;

    /// Apply the set fields of `entity` to the entity identified by `id`.
    async fn update(&self, id: K, entity: E) -> RepositoryResult<E>;

    /// Apply the set fields of `entity` to every listed id and return the
    /// resulting entities.
    async fn update_bulk(&self, ids: &[K], entity: E) -> RepositoryResult<Vec<E>>;

    /// Delete an entity and return what was removed.
    async fn remove(&self, id: K) -> RepositoryResult<E>;

    /// Delete a set of entities and return what was removed.
    async fn remove_bulk(&self, ids: &[K]) -> RepositoryResult<Vec<E>>;
}

#[async_trait]
impl<E, K, R> Repository<E, K> for Arc<R>
where
    R: Repository<E, K> + ?Sized,
    E: Send + 'static,
    K: Send + Sync + 'static,
{
    async fn create(&self, entity: E) -> RepositoryResult<E> {
        (**self).create(entity).await
    }

    async fn create_bulk(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        (**self).create_bulk(entities).await
    }

    async fn get(&self, id: K) -> RepositoryResult<E> {
        (**self).get(id).await
    }

    async fn find(&self, query: &Query) -> RepositoryResult<Vec<E>> {
        (**self).find(query).await
    }

    async fn find_by_ids(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        (**self).find_by_ids(ids).await
    }

    async fn update(&self, id: K, entity: E) -> RepositoryResult<E> {
        (**self).update(id, entity).await
    }

    async fn update_bulk(&self, ids: &[K], entity: E) -> RepositoryResult<Vec<E>> {
        (**self).update_bulk(ids, entity).await
    }

    async fn remove(&self, id: K) -> RepositoryResult<E> {
        (**self).remove(id).await
    }

    async fn remove_bulk(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        (**self).remove_bulk(ids).await
    }
}
