//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a static table descriptor.
//! Identifiers come only from descriptors; every value is a bound parameter.

use crate::entity::{ColumnType, Table, TENANT_COLUMN};
use crate::service::pagination::TimeRange;
use crate::store::{ListQuery, Record};
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

const MAIN_ALIAS: &str = "main";

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn col(name: &str) -> String {
    format!("{}.{}", MAIN_ALIAS, quoted(name))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn push_param(&mut self, v: Value) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// Bind a value and return its placeholder, cast to `ty`.
    fn placeholder(&mut self, v: Value, ty: &str) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, ty)
    }

    fn uuid(&mut self, id: Uuid) -> String {
        self.placeholder(Value::String(id.to_string()), "uuid")
    }

    fn timestamp(&mut self, t: DateTime<Utc>) -> String {
        self.placeholder(Value::String(t.to_rfc3339()), "timestamptz")
    }
}

/// Output columns of `table` read through the `main` alias: base fields, declared columns
/// (enums as text), then derived columns as scalar subqueries.
fn select_list(table: &Table) -> String {
    let mut parts = vec![
        format!("{} AS {}", col("id"), quoted("id")),
        format!("{} AS {}", col("created_at"), quoted("created_at")),
        format!("{} AS {}", col("updated_at"), quoted("updated_at")),
    ];
    for c in table.columns {
        let expr = match c.ty {
            ColumnType::Enum(_) => format!("{}::text", col(c.name)),
            _ => col(c.name),
        };
        parts.push(format!("{} AS {}", expr, quoted(c.name)));
    }
    for d in table.derived {
        parts.push(format!(
            "(SELECT sub.{id} FROM {t} sub WHERE sub.{fk} = {main_id} AND sub.{acct} = {main_acct} LIMIT 1) AS {name}",
            id = quoted("id"),
            t = quoted(d.table),
            fk = quoted(d.foreign_key),
            main_id = col("id"),
            acct = quoted(TENANT_COLUMN),
            main_acct = col(TENANT_COLUMN),
            name = quoted(d.name),
        ));
    }
    parts.join(", ")
}

fn from(table: &Table) -> String {
    format!("{} {}", quoted(table.name), MAIN_ALIAS)
}

/// Placeholder for a value written to or compared with a declared column.
fn column_placeholder(q: &mut QueryBuf, table: &Table, name: &str, v: Value) -> Option<String> {
    let c = table.column(name)?;
    Some(q.placeholder(v, c.ty.pg_cast()))
}

/// SELECT one row by id within a tenant.
pub fn select_by_id(table: &Table, id: Uuid, tenant: Uuid) -> QueryBuf {
    let mut q = QueryBuf::default();
    let id_ph = q.uuid(id);
    let tenant_ph = q.uuid(tenant);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} AND {} = {}",
        select_list(table),
        from(table),
        col("id"),
        id_ph,
        col(TENANT_COLUMN),
        tenant_ph
    );
    q
}

/// SELECT rows whose id is in `ids`, within a tenant. Empty `ids` selects nothing.
pub fn select_by_ids(table: &Table, ids: &[Uuid], tenant: Uuid) -> QueryBuf {
    let mut q = QueryBuf::default();
    let tenant_ph = q.uuid(tenant);
    let id_clause = if ids.is_empty() {
        "1 = 0".to_string()
    } else {
        let placeholders: Vec<String> = ids.iter().map(|id| q.uuid(*id)).collect();
        format!("{} IN ({})", col("id"), placeholders.join(", "))
    };
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} AND {}",
        select_list(table),
        from(table),
        col(TENANT_COLUMN),
        tenant_ph,
        id_clause
    );
    q
}

fn push_range(q: &mut QueryBuf, where_parts: &mut Vec<String>, column: &str, range: &TimeRange) {
    let bounds = [(range.gt, ">"), (range.gte, ">="), (range.lt, "<"), (range.lte, "<=")];
    for (bound, op) in bounds {
        if let Some(t) = bound {
            let ph = q.timestamp(t);
            where_parts.push(format!("{} {} {}", col(column), op, ph));
        }
    }
}

/// SELECT a page. Rows come back newest-first. With an `ending_before` cursor the rows just
/// newer than the boundary are taken in ascending order and then flipped.
pub fn select_list_page(table: &Table, query: &ListQuery) -> QueryBuf {
    let mut q = QueryBuf::default();
    let tenant_ph = q.uuid(query.tenant);
    let mut where_parts = vec![format!("{} = {}", col(TENANT_COLUMN), tenant_ph)];

    for (name, v) in &query.filters {
        if let Some(ph) = column_placeholder(&mut q, table, name, v.clone()) {
            where_parts.push(format!("{} = {}", col(name), ph));
        }
    }
    if let Some(range) = &query.created_at {
        push_range(&mut q, &mut where_parts, "created_at", range);
    }
    if let Some(range) = &query.updated_at {
        push_range(&mut q, &mut where_parts, "updated_at", range);
    }
    if let Some(t) = query.cursors.starting_after {
        let ph = q.timestamp(t);
        where_parts.push(format!("{} < {}", col("created_at"), ph));
    }
    let backward = query.cursors.ending_before;
    if let Some(t) = backward {
        let ph = q.timestamp(t);
        where_parts.push(format!("{} > {}", col("created_at"), ph));
    }

    let limit = query.limit.max(0);
    let inner_order = if backward.is_some() { "ASC" } else { "DESC" };
    let inner = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} {dir}, {} {dir} LIMIT {}",
        select_list(table),
        from(table),
        where_parts.join(" AND "),
        col("created_at"),
        col("id"),
        limit,
        dir = inner_order
    );
    q.sql = if backward.is_some() {
        format!(
            "SELECT * FROM ({}) page ORDER BY {} DESC, {} DESC",
            inner,
            quoted("created_at"),
            quoted("id")
        )
    } else {
        inner
    };
    q
}

/// INSERT one row owned by `tenant`; only declared columns present in `values` are written.
pub fn insert(table: &Table, tenant: Uuid, values: &Record) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut cols = vec![quoted(TENANT_COLUMN)];
    let mut placeholders = vec![q.uuid(tenant)];
    for c in table.columns {
        if let Some(v) = values.get(c.name) {
            cols.push(quoted(c.name));
            placeholders.push(q.placeholder(v.clone(), c.ty.pg_cast()));
        }
    }
    q.sql = format!(
        "INSERT INTO {} AS {} ({}) VALUES ({}) RETURNING {}",
        quoted(table.name),
        MAIN_ALIAS,
        cols.join(", "),
        placeholders.join(", "),
        select_list(table)
    );
    q
}

/// UPDATE by id within a tenant. Sets only declared columns present in `values` and always
/// bumps `updated_at`.
pub fn update(table: &Table, id: Uuid, tenant: Uuid, values: &Record) -> QueryBuf {
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for c in table.columns {
        if let Some(v) = values.get(c.name) {
            let ph = q.placeholder(v.clone(), c.ty.pg_cast());
            sets.push(format!("{} = {}", quoted(c.name), ph));
        }
    }
    sets.push(format!("{} = NOW()", quoted("updated_at")));
    let id_ph = q.uuid(id);
    let tenant_ph = q.uuid(tenant);
    q.sql = format!(
        "UPDATE {} AS {} SET {} WHERE {} = {} AND {} = {} RETURNING {}",
        quoted(table.name),
        MAIN_ALIAS,
        sets.join(", "),
        col("id"),
        id_ph,
        col(TENANT_COLUMN),
        tenant_ph,
        select_list(table)
    );
    q
}

/// DELETE by id within a tenant, returning the id when a row went away.
pub fn delete(table: &Table, id: Uuid, tenant: Uuid) -> QueryBuf {
    let mut q = QueryBuf::default();
    let id_ph = q.uuid(id);
    let tenant_ph = q.uuid(tenant);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} AND {} = {} RETURNING {}",
        quoted(table.name),
        quoted("id"),
        id_ph,
        quoted(TENANT_COLUMN),
        tenant_ph,
        quoted("id")
    );
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Column, Derived};
    use crate::service::pagination::Cursors;

    const THINGS: Table = Table {
        name: "things",
        columns: &[
            Column::new("name", ColumnType::Text),
            Column::new("kind", ColumnType::Enum("thing_kind")),
        ],
        derived: &[Derived {
            name: "tag",
            table: "tags",
            foreign_key: "thing",
        }],
    };

    #[test]
    fn select_by_id_is_tenant_scoped() {
        let q = select_by_id(&THINGS, Uuid::nil(), Uuid::nil());
        assert!(q.sql.contains("FROM \"things\" main WHERE main.\"id\" = $1::uuid AND main.\"account\" = $2::uuid"));
        assert!(q.sql.contains("main.\"kind\"::text AS \"kind\""));
        assert!(q.sql.contains("(SELECT sub.\"id\" FROM \"tags\" sub WHERE sub.\"thing\" = main.\"id\""));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn empty_id_batch_selects_nothing() {
        let q = select_by_ids(&THINGS, &[], Uuid::nil());
        assert!(q.sql.ends_with("AND 1 = 0"));
        assert_eq!(q.params.len(), 1);
    }

    #[test]
    fn insert_skips_unknown_columns() {
        let mut values = Record::new();
        values.insert("name".into(), Value::String("a".into()));
        values.insert("bogus".into(), Value::Bool(true));
        let q = insert(&THINGS, Uuid::nil(), &values);
        assert!(q.sql.starts_with("INSERT INTO \"things\" AS main (\"account\", \"name\") VALUES ($1::uuid, $2::text)"));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_always_bumps_updated_at() {
        let q = update(&THINGS, Uuid::nil(), Uuid::nil(), &Record::new());
        assert!(q.sql.contains("SET \"updated_at\" = NOW() WHERE main.\"id\" = $1::uuid"));
    }

    #[test]
    fn forward_page_orders_descending() {
        let query = ListQuery {
            limit: 3,
            ..ListQuery::default()
        };
        let q = select_list_page(&THINGS, &query);
        assert!(q.sql.ends_with("ORDER BY main.\"created_at\" DESC, main.\"id\" DESC LIMIT 3"));
    }

    #[test]
    fn backward_page_flips_ascending_subquery() {
        let query = ListQuery {
            limit: 3,
            cursors: Cursors {
                starting_after: None,
                ending_before: Some(Utc::now()),
            },
            ..ListQuery::default()
        };
        let q = select_list_page(&THINGS, &query);
        assert!(q.sql.contains("main.\"created_at\" > $2::timestamptz"));
        assert!(q.sql.contains("ASC LIMIT 3) page ORDER BY \"created_at\" DESC, \"id\" DESC"));
    }
}
