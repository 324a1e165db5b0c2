//! Cursor pagination: list parameters, cursor resolution, and over-fetch trimming.

use crate::entity::Entity;
use crate::error::AppError;
use crate::service::validation::{Constraint, FieldValue, Fields, Rule};
use crate::store::Fetchable;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

pub const PAGINATION_RULES: &[Rule] = &[
    Rule::new("limit", &[Constraint::Gte(1), Constraint::Lte(MAX_LIMIT)]),
    Rule::new("starting_after", &[Constraint::ExcludedWith("ending_before")]),
];

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub starting_after: Option<Uuid>,
    pub ending_before: Option<Uuid>,
}

impl PaginationParams {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    pub fn is_backward(&self) -> bool {
        self.ending_before.is_some()
    }
}

impl Fields for PaginationParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "limit" => FieldValue::int(self.limit),
            "starting_after" => FieldValue::present(&self.starting_after),
            "ending_before" => FieldValue::present(&self.ending_before),
            _ => FieldValue::Missing,
        }
    }
}

/// Inclusive/exclusive bounds on a timestamp column. Absent bounds leave that side open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct TimeRange {
    pub gt: Option<DateTime<Utc>>,
    pub gte: Option<DateTime<Utc>>,
    pub lt: Option<DateTime<Utc>>,
    pub lte: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.gt.map_or(true, |b| t > b)
            && self.gte.map_or(true, |b| t >= b)
            && self.lt.map_or(true, |b| t < b)
            && self.lte.map_or(true, |b| t <= b)
    }
}

/// Cursor ids resolved into creation-time boundaries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursors {
    pub starting_after: Option<DateTime<Utc>>,
    pub ending_before: Option<DateTime<Utc>>,
}

/// Look up a cursor's boundary timestamp. An id unknown to the tenant is a NotFound for
/// the listed resource type.
pub async fn resolve_cursor<T, F>(fetcher: &F, tenant: Uuid, id: Uuid) -> Result<DateTime<Utc>, AppError>
where
    T: Entity,
    F: Fetchable<T> + ?Sized,
{
    tracing::debug!(resource = T::NAME, cursor = %id, "resolving cursor");
    let row = fetcher.get(id, tenant).await?;
    row.base()
        .created_at
        .ok_or_else(|| AppError::Internal(format!("{} {} has no created_at", T::NAME, id)))
}

pub async fn resolve_cursors<T, F>(
    fetcher: &F,
    tenant: Uuid,
    page: &PaginationParams,
) -> Result<Cursors, AppError>
where
    T: Entity,
    F: Fetchable<T> + ?Sized,
{
    let mut cursors = Cursors::default();
    if let Some(id) = page.starting_after {
        cursors.starting_after = Some(resolve_cursor(fetcher, tenant, id).await?);
    }
    if let Some(id) = page.ending_before {
        cursors.ending_before = Some(resolve_cursor(fetcher, tenant, id).await?);
    }
    Ok(cursors)
}

/// Trim a result fetched with `limit + 1`. Rows arrive newest-first; when paging backward the
/// surplus row is the newest one, otherwise the oldest.
pub fn apply_limit<T>(mut rows: Vec<T>, limit: i64, backward: bool) -> (Vec<T>, bool) {
    let limit = limit.max(0) as usize;
    let has_more = rows.len() > limit;
    if has_more {
        if backward {
            rows.remove(0);
        } else {
            rows.pop();
        }
    }
    (rows, has_more)
}
