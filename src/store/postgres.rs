//! PostgreSQL adapter: builder SQL executed with sqlx, rows mapped to JSON and then into the entity.

use super::{not_found, Fetchable, ListQuery, Record, Repository};
use crate::entity::Entity;
use crate::error::AppError;
use crate::sql::{self, PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::marker::PhantomData;
use uuid::Uuid;

pub struct PgRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PgRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        PgRepository {
            pool,
            _entity: PhantomData,
        }
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let row = query.fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(PgBindValue::from_json(p));
        }
        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_one(&self, q: &QueryBuf, id: Uuid) -> Result<E, AppError> {
        let row = self.query_optional(q).await?.ok_or_else(|| not_found::<E>(id))?;
        Ok(serde_json::from_value(row)?)
    }

    async fn fetch_many(&self, q: &QueryBuf) -> Result<Vec<E>, AppError> {
        self.query_many(q)
            .await?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppError::from))
            .collect()
    }
}

#[async_trait]
impl<E: Entity> Fetchable<E> for PgRepository<E> {
    async fn get(&self, id: Uuid, tenant: Uuid) -> Result<E, AppError> {
        let q = sql::select_by_id(E::table(), id, tenant);
        self.fetch_one(&q, id).await
    }

    async fn list_by_ids(&self, ids: &[Uuid], tenant: Uuid) -> Result<Vec<E>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let q = sql::select_by_ids(E::table(), ids, tenant);
        self.fetch_many(&q).await
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for PgRepository<E> {
    async fn create(&self, tenant: Uuid, values: Record) -> Result<E, AppError> {
        let q = sql::insert(E::table(), tenant, &values);
        let row = self
            .query_optional(&q)
            .await?
            .ok_or_else(|| AppError::Db(sqlx::Error::RowNotFound))?;
        Ok(serde_json::from_value(row)?)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let q = sql::select_list_page(E::table(), query);
        self.fetch_many(&q).await
    }

    async fn update(&self, id: Uuid, tenant: Uuid, values: Record) -> Result<E, AppError> {
        let q = sql::update(E::table(), id, tenant, &values);
        self.fetch_one(&q, id).await
    }

    async fn delete(&self, id: Uuid, tenant: Uuid) -> Result<(), AppError> {
        let q = sql::delete(E::table(), id, tenant);
        match self.query_optional(&q).await? {
            Some(_) => Ok(()),
            None => Err(not_found::<E>(id)),
        }
    }
}

/// Row to JSON object. Columns whose value is NULL are left out so serde defaults apply.
fn row_to_json(row: &PgRow) -> Value {
    use sqlx::{Column, Row};
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        let v = cell_to_value(row, name);
        if !v.is_null() {
            map.insert(name.to_string(), v);
        }
    }
    Value::Object(map)
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
