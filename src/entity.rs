//! Shared entity model: base identity fields, expandable references, and the static
//! table descriptors the persistence adapters are driven by.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Name of the tenant-owner column present on every table.
pub const TENANT_COLUMN: &str = "account";

/// Identity fields carried by every resource. All optional so an existence check can
/// drop them without allocating.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Base {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Base {
    pub fn clear(&mut self) {
        *self = Base::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    Bool,
    Uuid,
    /// PostgreSQL enum type name; values travel as text.
    Enum(&'static str),
}

impl ColumnType {
    pub fn pg_cast(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Int => "bigint",
            ColumnType::Bool => "boolean",
            ColumnType::Uuid => "uuid",
            ColumnType::Enum(name) => name,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
}

impl Column {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Column { name, ty }
    }
}

/// Read-only column computed from another table: the id of the row in `table` whose
/// `foreign_key` points back at this row.
#[derive(Clone, Copy, Debug)]
pub struct Derived {
    pub name: &'static str,
    pub table: &'static str,
    pub foreign_key: &'static str,
}

/// Static description of a resource table. Base columns (`id`, `account`, `created_at`,
/// `updated_at`) are implied and not listed.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub derived: &'static [Derived],
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A persisted resource type.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Singular resource name used in error messages, e.g. "group".
    const NAME: &'static str;

    fn table() -> &'static Table;
    fn base(&self) -> &Base;
    fn base_mut(&mut self) -> &mut Base;

    fn id(&self) -> Option<Uuid> {
        self.base().id
    }
}

/// Reference to a related resource: the foreign id, plus the resource itself once expanded.
/// Serializes as the bare id (or null) while collapsed and as the nested object once expanded.
#[derive(Clone, Debug, PartialEq)]
pub struct Expandable<T> {
    pub id: Option<Uuid>,
    pub resource: Option<Box<T>>,
}

impl<T> Expandable<T> {
    pub fn new(id: Option<Uuid>) -> Self {
        Expandable { id, resource: None }
    }

    pub fn is_expanded(&self) -> bool {
        self.resource.is_some()
    }
}

impl<T> Default for Expandable<T> {
    fn default() -> Self {
        Expandable::new(None)
    }
}

impl<T: Serialize> Serialize for Expandable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.resource {
            Some(resource) => resource.serialize(serializer),
            None => self.id.serialize(serializer),
        }
    }
}

impl<'de, T> Deserialize<'de> for Expandable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<Uuid>::deserialize(deserializer).map(Expandable::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Node {
        #[serde(flatten)]
        base: Base,
        name: String,
        #[serde(default)]
        parent: Expandable<Node>,
    }

    #[test]
    fn collapsed_reference_serializes_as_id() {
        let id = Uuid::new_v4();
        let node = Node {
            base: Base::default(),
            name: "leaf".into(),
            parent: Expandable::new(Some(id)),
        };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v, serde_json::json!({ "name": "leaf", "parent": id.to_string() }));
    }

    #[test]
    fn expanded_reference_serializes_nested() {
        let id = Uuid::new_v4();
        let parent = Node {
            base: Base { id: Some(id), ..Base::default() },
            name: "root".into(),
            parent: Expandable::default(),
        };
        let node = Node {
            base: Base::default(),
            name: "leaf".into(),
            parent: Expandable { id: Some(id), resource: Some(Box::new(parent)) },
        };
        let v = serde_json::to_value(&node).unwrap();
        assert_eq!(v["parent"]["name"], "root");
        assert_eq!(v["parent"]["id"], id.to_string());
        assert!(v["parent"]["parent"].is_null());
    }

    #[test]
    fn reference_deserializes_from_id_or_null() {
        let id = Uuid::new_v4();
        let node: Node =
            serde_json::from_value(serde_json::json!({ "name": "a", "parent": id })).unwrap();
        assert_eq!(node.parent, Expandable::new(Some(id)));
        let node: Node =
            serde_json::from_value(serde_json::json!({ "name": "a", "parent": null })).unwrap();
        assert_eq!(node.parent.id, None);
    }
}
