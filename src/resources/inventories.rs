use super::{Params, Resource};
use crate::entity::{Base, Column, ColumnType, Entity, Table};
use crate::service::validation::{Constraint, FieldValue, Fields, Rule};
use crate::store::{Repositories, Repository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

static TABLE: Table = Table {
    name: "inventories",
    columns: &[
        Column::new("in_stock", ColumnType::Int),
        Column::new("orderable", ColumnType::Int),
    ],
    derived: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub in_stock: i64,
    #[serde(default)]
    pub orderable: Option<i64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryCreateParams {
    pub in_stock: Option<i64>,
    pub orderable: Option<i64>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for InventoryCreateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "in_stock" => FieldValue::int(self.in_stock),
            "orderable" => FieldValue::int(self.orderable),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for InventoryCreateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryUpdateParams {
    pub in_stock: Option<i64>,
    pub orderable: Option<i64>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for InventoryUpdateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "in_stock" => FieldValue::int(self.in_stock),
            "orderable" => FieldValue::int(self.orderable),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for InventoryUpdateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryFilter {
    pub in_stock: Option<i64>,
    pub orderable: Option<i64>,
}

impl Fields for InventoryFilter {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "in_stock" => FieldValue::int(self.in_stock),
            "orderable" => FieldValue::int(self.orderable),
            _ => FieldValue::Missing,
        }
    }
}

pub(crate) const INVENTORY_CREATE_RULES: &[Rule] = &[
    Rule::new("in_stock", &[Constraint::Required, Constraint::Gte(0)]),
    Rule::new("orderable", &[Constraint::Gte(0)]),
];

impl Entity for Inventory {
    const NAME: &'static str = "inventory";

    fn table() -> &'static Table {
        &TABLE
    }

    fn base(&self) -> &Base {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base {
        &mut self.base
    }
}

#[async_trait]
impl Resource for Inventory {
    type CreateParams = InventoryCreateParams;
    type UpdateParams = InventoryUpdateParams;
    type Filter = InventoryFilter;

    const CREATE_RULES: &'static [Rule] = INVENTORY_CREATE_RULES;
    const UPDATE_RULES: &'static [Rule] = &[
        Rule::new("in_stock", &[Constraint::Gte(0)]),
        Rule::new("orderable", &[Constraint::Gte(0)]),
    ];
    // Nothing on an inventory is expandable.
    const EXPAND_RULES: &'static [Rule] = &[Rule::new("expand", &[Constraint::OneOf(&[])])];

    fn repository(repos: &Repositories) -> &dyn Repository<Self> {
        repos.inventories.as_ref()
    }
}
