//! In-process store with the same contract as the PostgreSQL adapter.

use super::{not_found, Fetchable, ListQuery, Record, Repository};
use crate::entity::{Entity, Table};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

#[derive(Clone, Debug)]
struct StoredRow {
    id: Uuid,
    account: Uuid,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    values: Record,
}

type Tables = HashMap<&'static str, Vec<StoredRow>>;

/// Rows of every table, shared by all memory repositories of one `Repositories`.
#[derive(Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryDatabase {
    /// Wall-clock time, bumped so that no two calls return the same instant.
    fn now(&self) -> Result<DateTime<Utc>, AppError> {
        let mut last = self.clock.lock().map_err(|_| poisoned())?;
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        Ok(now)
    }
}

fn poisoned() -> AppError {
    AppError::Internal("memory store lock poisoned".into())
}

pub struct MemoryRepository<E> {
    db: Arc<MemoryDatabase>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        MemoryRepository {
            db,
            _entity: PhantomData,
        }
    }

    fn table() -> &'static Table {
        E::table()
    }

    fn known_columns(values: Record) -> Record {
        let table = Self::table();
        values
            .into_iter()
            .filter(|(k, _)| table.column(k).is_some())
            .collect()
    }

    fn materialize(tables: &Tables, row: &StoredRow) -> Result<E, AppError> {
        let mut obj = row.values.clone();
        obj.insert("id".into(), Value::String(row.id.to_string()));
        obj.insert("created_at".into(), serde_json::to_value(row.created_at)?);
        if let Some(t) = row.updated_at {
            obj.insert("updated_at".into(), serde_json::to_value(t)?);
        }
        let own_id = Value::String(row.id.to_string());
        for d in Self::table().derived {
            let found = tables
                .get(d.table)
                .and_then(|rows| {
                    rows.iter()
                        .find(|r| r.account == row.account && r.values.get(d.foreign_key) == Some(&own_id))
                })
                .map(|r| Value::String(r.id.to_string()))
                .unwrap_or(Value::Null);
            obj.insert(d.name.to_string(), found);
        }
        Ok(serde_json::from_value(Value::Object(obj))?)
    }

    fn matches(row: &StoredRow, query: &ListQuery) -> bool {
        if row.account != query.tenant {
            return false;
        }
        if !query.filters.iter().all(|(k, v)| row.values.get(k) == Some(v)) {
            return false;
        }
        if let Some(range) = &query.created_at {
            if !range.contains(row.created_at) {
                return false;
            }
        }
        if let Some(range) = &query.updated_at {
            match row.updated_at {
                Some(t) if range.contains(t) => {}
                _ => return false,
            }
        }
        if let Some(b) = query.cursors.starting_after {
            if row.created_at >= b {
                return false;
            }
        }
        if let Some(b) = query.cursors.ending_before {
            if row.created_at <= b {
                return false;
            }
        }
        true
    }
}

#[async_trait]
impl<E: Entity> Fetchable<E> for MemoryRepository<E> {
    async fn get(&self, id: Uuid, tenant: Uuid) -> Result<E, AppError> {
        let tables = self.db.tables.read().map_err(|_| poisoned())?;
        let row = tables
            .get(Self::table().name)
            .and_then(|rows| rows.iter().find(|r| r.id == id && r.account == tenant))
            .ok_or_else(|| not_found::<E>(id))?;
        Self::materialize(&tables, row)
    }

    async fn list_by_ids(&self, ids: &[Uuid], tenant: Uuid) -> Result<Vec<E>, AppError> {
        let tables = self.db.tables.read().map_err(|_| poisoned())?;
        let Some(rows) = tables.get(Self::table().name) else {
            return Ok(Vec::new());
        };
        rows.iter()
            .filter(|r| r.account == tenant && ids.contains(&r.id))
            .map(|r| Self::materialize(&tables, r))
            .collect()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn create(&self, tenant: Uuid, values: Record) -> Result<E, AppError> {
        let now = self.db.now()?;
        let row = StoredRow {
            id: Uuid::new_v4(),
            account: tenant,
            created_at: now,
            updated_at: None,
            values: Self::known_columns(values),
        };
        let mut tables = self.db.tables.write().map_err(|_| poisoned())?;
        tables.entry(Self::table().name).or_default().push(row.clone());
        Self::materialize(&tables, &row)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<E>, AppError> {
        let tables = self.db.tables.read().map_err(|_| poisoned())?;
        let mut rows: Vec<&StoredRow> = tables
            .get(Self::table().name)
            .map(|rows| rows.iter().filter(|r| Self::matches(r, query)).collect())
            .unwrap_or_default();
        let limit = query.limit.max(0) as usize;
        if query.cursors.ending_before.is_some() {
            rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
            rows.truncate(limit);
            rows.reverse();
        } else {
            rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            rows.truncate(limit);
        }
        rows.into_iter().map(|r| Self::materialize(&tables, r)).collect()
    }

    async fn update(&self, id: Uuid, tenant: Uuid, values: Record) -> Result<E, AppError> {
        let now = self.db.now()?;
        let mut tables = self.db.tables.write().map_err(|_| poisoned())?;
        let row = tables
            .get_mut(Self::table().name)
            .and_then(|rows| rows.iter_mut().find(|r| r.id == id && r.account == tenant))
            .ok_or_else(|| not_found::<E>(id))?;
        row.values.extend(Self::known_columns(values));
        row.updated_at = Some(now);
        let row = row.clone();
        Self::materialize(&tables, &row)
    }

    async fn delete(&self, id: Uuid, tenant: Uuid) -> Result<(), AppError> {
        let mut tables = self.db.tables.write().map_err(|_| poisoned())?;
        let rows = tables.entry(Self::table().name).or_default();
        let before = rows.len();
        rows.retain(|r| !(r.id == id && r.account == tenant));
        if rows.len() == before {
            return Err(not_found::<E>(id));
        }
        Ok(())
    }
}
