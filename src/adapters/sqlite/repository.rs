//! SQLite implementation of the Repository port.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use tracing::instrument;

use super::entity::{SqlEntity, Value};
use super::query::quote_ident;
use crate::domain::errors::{RepositoryError, RepositoryResult};
use crate::domain::models::Query;
use crate::domain::ports::Repository;

/// Bound parameters SQLite accepts in one statement.
pub const MAX_BIND_PARAMS: usize = 32_766;

/// Key types usable with [`SqlRepository`].
pub trait SqlKey:
    for<'q> sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite> + Display + Clone + Send + Sync + 'static
{
}

impl<K> SqlKey for K where
    K: for<'q> sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite> + Display + Clone + Send + Sync + 'static
{
}

/// Repository over one SQLite table, driven by the entity's [`SqlEntity`]
/// mapping.
///
/// Bulk operations split their input so no statement binds more than
/// [`MAX_BIND_PARAMS`] values. The resulting writes run in one transaction.
pub struct SqlRepository<E, K> {
    pool: SqlitePool,
    _marker: PhantomData<fn() -> (E, K)>,
}

/// Hashable form of a key column value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum RowKey {
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl RowKey {
    fn of<E: SqlEntity>(entity: &E) -> Option<Self> {
        entity
            .columns()
            .into_iter()
            .find(|(column, _)| *column == E::KEY_COLUMN)
            .and_then(|(_, value)| match value {
                Value::Integer(v) => Some(Self::Integer(v)),
                Value::Text(v) => Some(Self::Text(v)),
                Value::Blob(v) => Some(Self::Blob(v)),
                Value::Null | Value::Real(_) => None,
            })
    }
}

/// One input row of a bulk insert.
struct PendingRow {
    index: usize,
    key: Option<RowKey>,
    values: Vec<Value>,
}

/// Rows that set exactly the same columns, so they share one INSERT shape.
struct InsertGroup {
    columns: Vec<&'static str>,
    rows: Vec<PendingRow>,
}

/// Group entities by the columns they set, in first-seen order.
///
/// A column a row leaves unset is omitted from that row's INSERT, never
/// bound as NULL, so column defaults still apply.
fn group_by_columns<E: SqlEntity>(entities: Vec<E>) -> Vec<InsertGroup> {
    let mut groups: Vec<InsertGroup> = Vec::new();
    let mut group_of: HashMap<Vec<&'static str>, usize> = HashMap::new();

    for (index, entity) in entities.into_iter().enumerate() {
        let key = RowKey::of(&entity);
        let (columns, values): (Vec<_>, Vec<_>) = entity.set_columns().into_iter().unzip();
        let at = *group_of.entry(columns).or_insert_with_key(|columns| {
            groups.push(InsertGroup {
                columns: columns.clone(),
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        if let Some(group) = groups.get_mut(at) {
            group.rows.push(PendingRow { index, key, values });
        }
    }
    groups
}

/// For each inserted row, the position of its row in `returned`.
///
/// `RETURNING` yields rows in no guaranteed order. Rows inserted with an
/// explicit key are matched on it. Rows whose integer key was assigned on
/// insert are sorted by it, since SQLite assigns increasing rowids in VALUES
/// order. `None` when neither applies.
fn returned_positions<E: SqlEntity>(input_keys: &[Option<RowKey>], returned: &[E]) -> Option<Vec<usize>> {
    if input_keys.len() != returned.len() {
        return None;
    }
    let returned_keys = returned.iter().map(RowKey::of).collect::<Option<Vec<_>>>()?;

    if input_keys.iter().all(Option::is_none) {
        if !returned_keys.iter().all(|key| matches!(key, RowKey::Integer(_))) {
            return None;
        }
        let mut positions: Vec<usize> = (0..returned_keys.len()).collect();
        positions.sort_by(|&a, &b| returned_keys[a].cmp(&returned_keys[b]));
        return Some(positions);
    }

    let position_of: HashMap<&RowKey, usize> = returned_keys.iter().enumerate().map(|(i, key)| (key, i)).collect();
    input_keys
        .iter()
        .map(|key| key.as_ref().and_then(|key| position_of.get(key).copied()))
        .collect()
}

/// Reorder `returned` to follow the inserted rows, keeping the returned
/// order when no key allows matching.
fn in_input_order<E: SqlEntity>(input_keys: &[Option<RowKey>], returned: Vec<E>) -> Vec<E> {
    let Some(positions) = returned_positions(input_keys, &returned) else {
        tracing::debug!(rows = returned.len(), "bulk insert order not verifiable by key");
        return returned;
    };
    let mut slots: Vec<Option<E>> = returned.into_iter().map(Some).collect();
    positions
        .into_iter()
        .filter_map(|at| slots.get_mut(at).and_then(Option::take))
        .collect()
}

impl<E, K> SqlRepository<E, K>
where
    E: SqlEntity,
    K: SqlKey,
{
    /// Repository over `E::TABLE` in `pool`.
    pub const fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _marker: PhantomData,
        }
    }

    /// The underlying connection pool.
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn table() -> String {
        quote_ident(E::TABLE)
    }

    fn push_key_in(builder: &mut QueryBuilder<'_, Sqlite>, ids: &[K]) {
        builder.push(quote_ident(E::KEY_COLUMN)).push(" IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(")");
    }

    fn push_key_eq(builder: &mut QueryBuilder<'_, Sqlite>, id: &K) {
        builder
            .push(quote_ident(E::KEY_COLUMN))
            .push(" = ")
            .push_bind(id.clone());
    }

    fn push_assignments(builder: &mut QueryBuilder<'_, Sqlite>, changes: Vec<(&'static str, Value)>) {
        for (i, (column, value)) in changes.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push(quote_ident(column)).push(" = ");
            value.push_bind(builder);
        }
    }

    async fn insert_defaults(conn: &mut SqliteConnection) -> RepositoryResult<E> {
        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        builder.push(Self::table()).push(" DEFAULT VALUES RETURNING *");
        Ok(builder.build_query_as::<E>().fetch_one(&mut *conn).await?)
    }

    /// Multi-row insert of `rows`, each holding one value per column.
    async fn insert_rows(
        conn: &mut SqliteConnection,
        columns: &[&'static str],
        rows: Vec<Vec<Value>>,
    ) -> RepositoryResult<Vec<E>> {
        let mut builder = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        builder.push(Self::table()).push(" (");
        builder.push(columns.iter().map(|c| quote_ident(c)).collect::<Vec<_>>().join(", "));
        builder.push(") VALUES ");

        for (i, values) in rows.into_iter().enumerate() {
            if i > 0 {
                builder.push(", ");
            }
            builder.push("(");
            for (j, value) in values.into_iter().enumerate() {
                if j > 0 {
                    builder.push(", ");
                }
                value.push_bind(&mut builder);
            }
            builder.push(")");
        }
        builder.push(" RETURNING *");

        Ok(builder.build_query_as::<E>().fetch_all(&mut *conn).await?)
    }

    async fn insert_one(conn: &mut SqliteConnection, entity: E) -> RepositoryResult<E> {
        let (columns, values): (Vec<_>, Vec<_>) = entity.set_columns().into_iter().unzip();
        if columns.is_empty() {
            return Self::insert_defaults(conn).await;
        }
        Self::insert_rows(conn, &columns, vec![values])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::from(sqlx::Error::RowNotFound))
    }
}

#[async_trait]
impl<E, K> Repository<E, K> for SqlRepository<E, K>
where
    E: SqlEntity,
    K: SqlKey,
{
    #[instrument(level = "debug", skip_all, fields(table = E::TABLE))]
    async fn create(&self, entity: E) -> RepositoryResult<E> {
        let mut conn = self.pool.acquire().await?;
        Self::insert_one(&mut conn, entity).await
    }

    /// Rows setting the same columns share a multi-row INSERT; results come
    /// back in input order. All inserts commit together or not at all.
    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, count = entities.len()))]
    async fn create_bulk(&self, entities: Vec<E>) -> RepositoryResult<Vec<E>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut created: Vec<Option<E>> = (0..entities.len()).map(|_| None).collect();
        let mut tx = self.pool.begin().await?;

        for group in group_by_columns(entities) {
            if group.columns.is_empty() {
                for row in group.rows {
                    let entity = Self::insert_defaults(&mut tx).await?;
                    if let Some(slot) = created.get_mut(row.index) {
                        *slot = Some(entity);
                    }
                }
                continue;
            }

            let per_statement = (MAX_BIND_PARAMS / group.columns.len()).max(1);
            let mut rows = group.rows.into_iter().peekable();
            while rows.peek().is_some() {
                let chunk: Vec<PendingRow> = rows.by_ref().take(per_statement).collect();
                let indices: Vec<usize> = chunk.iter().map(|row| row.index).collect();
                let keys: Vec<Option<RowKey>> = chunk.iter().map(|row| row.key.clone()).collect();
                let values = chunk.into_iter().map(|row| row.values).collect();

                let returned = Self::insert_rows(&mut tx, &group.columns, values).await?;
                for (index, entity) in indices.into_iter().zip(in_input_order(&keys, returned)) {
                    if let Some(slot) = created.get_mut(index) {
                        *slot = Some(entity);
                    }
                }
            }
        }

        tx.commit().await?;
        let created: Vec<E> = created.into_iter().flatten().collect();
        tracing::debug!(created = created.len(), "bulk insert complete");
        Ok(created)
    }

    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, id = %id))]
    async fn get(&self, id: K) -> RepositoryResult<E> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        builder.push(Self::table()).push(" WHERE ");
        Self::push_key_eq(&mut builder, &id);

        builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::TABLE, &id))
    }

    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, order = %query.order_by()))]
    async fn find(&self, query: &Query) -> RepositoryResult<Vec<E>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
        builder.push(Self::table());
        query.push_sql(&mut builder)?;

        let rows = builder.build_query_as::<E>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, count = ids.len()))]
    async fn find_by_ids(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        let mut rows = Vec::new();
        for chunk in ids.chunks(MAX_BIND_PARAMS) {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT * FROM ");
            builder.push(Self::table()).push(" WHERE ");
            Self::push_key_in(&mut builder, chunk);

            rows.extend(builder.build_query_as::<E>().fetch_all(&self.pool).await?);
        }
        Ok(rows)
    }

    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, id = %id))]
    async fn update(&self, id: K, entity: E) -> RepositoryResult<E> {
        let changes = entity.changes();
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE ");
        builder.push(Self::table()).push(" SET ");
        Self::push_assignments(&mut builder, changes);
        builder.push(" WHERE ");
        Self::push_key_eq(&mut builder, &id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::not_found(E::TABLE, &id))
    }

    /// Writes every id in one transaction, then reads the rows back. Another
    /// writer may change them between the two steps.
    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, count = ids.len()))]
    async fn update_bulk(&self, ids: &[K], entity: E) -> RepositoryResult<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let changes = entity.changes();
        if !changes.is_empty() {
            let per_statement = MAX_BIND_PARAMS.saturating_sub(changes.len()).max(1);
            let mut tx = self.pool.begin().await?;
            let mut rows_affected = 0;
            for chunk in ids.chunks(per_statement) {
                let mut builder = QueryBuilder::<Sqlite>::new("UPDATE ");
                builder.push(Self::table()).push(" SET ");
                Self::push_assignments(&mut builder, changes.clone());
                builder.push(" WHERE ");
                Self::push_key_in(&mut builder, chunk);

                rows_affected += builder.build().execute(&mut *tx).await?.rows_affected();
            }
            tx.commit().await?;
            tracing::debug!(rows_affected, "bulk update applied");
        }

        self.find_by_ids(ids).await
    }

    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, id = %id))]
    async fn remove(&self, id: K) -> RepositoryResult<E> {
        let entity = self.get(id.clone()).await?;

        let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM ");
        builder.push(Self::table()).push(" WHERE ");
        Self::push_key_eq(&mut builder, &id);
        builder.build().execute(&self.pool).await?;

        Ok(entity)
    }

    /// Reads the rows, then deletes them in one transaction. Rows removed by
    /// someone else in between are still reported.
    #[instrument(level = "debug", skip_all, fields(table = E::TABLE, count = ids.len()))]
    async fn remove_bulk(&self, ids: &[K]) -> RepositoryResult<Vec<E>> {
        let removed = self.find_by_ids(ids).await?;
        if removed.is_empty() {
            return Ok(removed);
        }

        let mut tx = self.pool.begin().await?;
        let mut rows_affected = 0;
        for chunk in ids.chunks(MAX_BIND_PARAMS) {
            let mut builder = QueryBuilder::<Sqlite>::new("DELETE FROM ");
            builder.push(Self::table()).push(" WHERE ");
            Self::push_key_in(&mut builder, chunk);
            rows_affected += builder.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        tracing::debug!(rows_affected, "bulk delete applied");

        Ok(removed)
    }
}
