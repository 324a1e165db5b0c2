//! Persistence seam. Every call is tenant-scoped; a row owned by another tenant is
//! indistinguishable from a missing one.

mod memory;
mod postgres;

pub use memory::{MemoryDatabase, MemoryRepository};
pub use postgres::PgRepository;

use crate::entity::Entity;
use crate::error::AppError;
use crate::resources::{Group, Inventory, Item, ItemIdentifiers, Price};
use crate::service::pagination::{Cursors, TimeRange};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Column name to value, as written by create/update or matched by list filters.
pub type Record = Map<String, Value>;

/// Lookup by id, single and batched.
#[async_trait]
pub trait Fetchable<T>: Send + Sync {
    /// NotFound (naming the resource) when the id does not exist for the tenant.
    async fn get(&self, id: Uuid, tenant: Uuid) -> Result<T, AppError>;
    /// Rows for whichever ids exist; missing ids are skipped.
    async fn list_by_ids(&self, ids: &[Uuid], tenant: Uuid) -> Result<Vec<T>, AppError>;
}

#[async_trait]
pub trait Repository<E>: Fetchable<E> {
    async fn create(&self, tenant: Uuid, values: Record) -> Result<E, AppError>;
    /// Rows newest-first, at most `query.limit` of them.
    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, AppError>;
    async fn update(&self, id: Uuid, tenant: Uuid, values: Record) -> Result<E, AppError>;
    async fn delete(&self, id: Uuid, tenant: Uuid) -> Result<(), AppError>;
}

/// Everything the store needs to run one list query. `limit` already includes the
/// look-ahead row.
#[derive(Clone, Debug, Default)]
pub struct ListQuery {
    pub tenant: Uuid,
    pub filters: Record,
    pub created_at: Option<TimeRange>,
    pub updated_at: Option<TimeRange>,
    pub cursors: Cursors,
    pub limit: i64,
}

/// One repository per resource.
pub struct Repositories {
    pub groups: Box<dyn Repository<Group>>,
    pub inventories: Box<dyn Repository<Inventory>>,
    pub items: Box<dyn Repository<Item>>,
    pub item_identifiers: Box<dyn Repository<ItemIdentifiers>>,
    pub prices: Box<dyn Repository<Price>>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Repositories {
            groups: Box::new(PgRepository::<Group>::new(pool.clone())),
            inventories: Box::new(PgRepository::<Inventory>::new(pool.clone())),
            items: Box::new(PgRepository::<Item>::new(pool.clone())),
            item_identifiers: Box::new(PgRepository::<ItemIdentifiers>::new(pool.clone())),
            prices: Box::new(PgRepository::<Price>::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let db = Arc::new(MemoryDatabase::default());
        Repositories {
            groups: Box::new(MemoryRepository::<Group>::new(db.clone())),
            inventories: Box::new(MemoryRepository::<Inventory>::new(db.clone())),
            items: Box::new(MemoryRepository::<Item>::new(db.clone())),
            item_identifiers: Box::new(MemoryRepository::<ItemIdentifiers>::new(db.clone())),
            prices: Box::new(MemoryRepository::<Price>::new(db)),
        }
    }
}

/// Serialize a parameter object into a column record, dropping unset fields.
pub fn to_record<T: serde::Serialize>(params: &T) -> Result<Record, AppError> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => Err(AppError::Internal(format!("expected an object, got {}", other))),
    }
}

pub(crate) fn not_found<E: Entity>(id: Uuid) -> AppError {
    AppError::not_found(E::NAME, id)
}
