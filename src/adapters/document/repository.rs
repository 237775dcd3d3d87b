//! MongoDB implementation of the Repository port.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Display;
use std::marker::PhantomData;
use tracing::instrument;

use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::Query;
use crate::domain::ports::Repository;

const BACKEND: &str = "mongodb";
const ID_FIELD: &str = "_id";

/// Repository over one MongoDB collection.
///
/// Entities are stored as their serde document form; identity lives in the
/// `_id` field. A missing or null `_id` on insert is assigned by the server
/// and written back into the returned entity.
pub struct DocumentRepository<E, K> {
    collection: Collection<Document>,
    _marker: PhantomData<fn() -> (E, K)>,
}

impl<E, K> DocumentRepository<E, K>
where
    E: Serialize + DeserializeOwned + Send + Sync + 'static,
    K: Serialize + Display + Send + Sync + 'static,
{
    /// Repository over `collection` in `database`.
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
            _marker: PhantomData,
        }
    }

    /// Name of the backing collection.
    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    fn id_filter(id: &K) -> RepositoryResult<Document> {
        Ok(doc! { ID_FIELD: bson::to_bson(id)? })
    }

    fn ids_filter(ids: &[K]) -> RepositoryResult<Document> {
        let ids = ids.iter().map(bson::to_bson).collect::<Result<Vec<_>, _>>()?;
        Ok(doc! { ID_FIELD: { "$in": ids } })
    }

    fn decode(document: Document) -> RepositoryResult<E> {
        Ok(bson::from_document(document)?)
    }

    fn decode_all(documents: Vec<Document>) -> RepositoryResult<Vec<E>> {
        documents.into_iter().map(Self::decode).collect()
    }

    async fn fetch(&self, filter: Option<Document>, query: Option<&Query>) -> RepositoryResult<Vec<E>> {
        let options = query.map(Query::find_options);
        let documents: Vec<Document> = self.collection.find(filter, options).await?.try_collect().await?;
        Self::decode_all(documents)
    }
}

/// Serialize an entity that must be a document for `operation` to make sense.
fn to_document<E: Serialize>(entity: &E, operation: &'static str) -> RepositoryResult<Document> {
    match bson::to_bson(entity)? {
        Bson::Document(document) => Ok(document),
        other => Err(RepositoryError::Unsupported {
            backend: BACKEND,
            operation,
            reason: format!("entity serializes to {:?}, not a document", other.element_type()),
        }),
    }
}

/// Document ready for insertion: a null `_id` is dropped so the server
/// assigns one.
fn insertable<E: Serialize>(entity: &E, operation: &'static str) -> RepositoryResult<Document> {
    let mut document = to_document(entity, operation)?;
    if matches!(document.get(ID_FIELD), Some(Bson::Null)) {
        document.remove(ID_FIELD);
    }
    Ok(document)
}

/// `$set` payload for a partial update: every non-null field except `_id`.
fn set_fields<E: Serialize>(entity: &E, operation: &'static str) -> RepositoryResult<Document> {
    Ok(to_document(entity, operation)?
        .into_iter()
        .filter(|(key, value)| key != ID_FIELD && !matches!(value, Bson::Null))
        .collect())
}

#[async_trait]
impl<E, K> Repository<E, K> for DocumentRepository<E, K>
where
    E: Serialize + DeserializeOwned + Send + Sync + 'static,
    K: Serialize + Display + Send + Sync + 'static,
{
    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name()))]
    async fn create(&self, entity: E) -> RepositoryResult<E> {
        let mut document = insertable(&entity, "create")?;
        let result = self.collection.insert_one(&document, None).await?;
        document.insert(ID_FIELD, result.inserted_id);
        Self::decode(document)
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), count = entities.len()))]
    async fn create_bulk(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let documents = entities
            .iter()
            .map(|entity| insertable(entity, "create_bulk"))
            .collect::<RepositoryResult<Vec<_>>>()?;
        let mut result = self.collection.insert_many(&documents, None).await?;

        documents
            .into_iter()
            .enumerate()
            .map(|(i, mut document)| {
                if let Some(id) = result.inserted_ids.remove(&i) {
                    document.insert(ID_FIELD, id);
                }
                Self::decode(document)
            })
            .collect()
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), id = %id))]
    async fn get(&self, id: K) -> RepositoryResult<E> {
        let document = self
            .collection
            .find_one(Self::id_filter(&id)?, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(self.collection.name(), &id))?;
        Self::decode(document)
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), order = %query.order_by()))]
    async fn find(&self, query: &Query) -> RepositoryResult<Vec<E>> {
        self.fetch(None, Some(query)).await
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), count = ids.len()))]
    async fn find_by_ids(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch(Some(Self::ids_filter(ids)?), None).await
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), id = %id))]
    async fn update(&self, id: K, entity: E) -> RepositoryResult<E> {
        let fields = set_fields(&entity, "update")?;
        if fields.is_empty() {
            return self.get(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let document = self
            .collection
            .find_one_and_update(Self::id_filter(&id)?, doc! { "$set": fields }, options)
            .await?
            .ok_or_else(|| RepositoryError::not_found(self.collection.name(), &id))?;
        Self::decode(document)
    }

    /// Writes every id in one statement, then reads the documents back.
    /// Another writer may change them between the two calls.
    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), count = ids.len()))]
    async fn update_bulk(&self, ids: &[K], entity: E) -> RepositoryResult<Vec<E>> {
        let fields = set_fields(&entity, "update_bulk")?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        if !fields.is_empty() {
            let result = self
                .collection
                .update_many(Self::ids_filter(ids)?, doc! { "$set": fields }, None)
                .await?;
            tracing::debug!(modified = result.modified_count, "bulk update applied");
        }

        self.find_by_ids(ids).await
    }

    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), id = %id))]
    async fn remove(&self, id: K) -> RepositoryResult<E> {
        let document = self
            .collection
            .find_one_and_delete(Self::id_filter(&id)?, None)
            .await?
            .ok_or_else(|| RepositoryError::not_found(self.collection.name(), &id))?;
        Self::decode(document)
    }

    /// Reads the documents, then deletes them. Documents removed by someone
    /// else in between are still reported.
    #[instrument(level = "debug", skip_all, fields(collection = %self.collection.name(), count = ids.len()))]
    async fn remove_bulk(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        let removed = self.find_by_ids(ids).await?;
        if removed.is_empty() {
            return Ok(removed);
        }

        let result = self.collection.delete_many(Self::ids_filter(ids)?, None).await?;
        tracing::debug!(deleted = result.deleted_count, "bulk delete applied");
        Ok(removed)
    }
}
