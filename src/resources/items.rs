use super::groups::GROUP_CREATE_RULES;
use super::inventories::INVENTORY_CREATE_RULES;
use super::item_identifiers::{Codes, CODE_RULES};
use super::prices::PRICE_CREATE_RULES;
use super::{
    wants, Group, GroupCreateParams, Inventory, InventoryCreateParams, ItemIdentifiers, ItemIdentifiersCreateParams,
    Params, Price, PriceCreateParams, Resource,
};
use crate::entity::{Base, Column, ColumnType, Derived, Entity, Expandable, Table};
use crate::error::AppError;
use crate::service::expand::{expand_many, expand_one};
use crate::service::validation::{Constraint, FieldValue, Fields, Rule};
use crate::store::{to_record, Record, Repositories, Repository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

static TABLE: Table = Table {
    name: "items",
    columns: &[
        Column::new("active", ColumnType::Bool),
        Column::new("description", ColumnType::Text),
        Column::new("group", ColumnType::Uuid),
        Column::new("inventory", ColumnType::Uuid),
        Column::new("name", ColumnType::Text),
        Column::new("type", ColumnType::Enum("item_type")),
        Column::new("variant", ColumnType::Bool),
    ],
    derived: &[Derived {
        name: "identifiers",
        table: "item_identifiers",
        foreign_key: "item",
    }],
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    #[default]
    #[serde(rename = "PRODUCT")]
    Product,
    #[serde(rename = "SERVICE")]
    Service,
}

impl ItemType {
    pub const NAMES: &'static [&'static str] = &["PRODUCT", "SERVICE"];
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Expandable<Group>,
    #[serde(default)]
    pub identifiers: Expandable<ItemIdentifiers>,
    #[serde(default)]
    pub inventory: Expandable<Inventory>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub variant: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemCreateParams {
    pub active: Option<bool>,
    pub description: Option<String>,
    pub group: Option<Uuid>,
    #[serde(skip_serializing)]
    pub group_data: Option<GroupCreateParams>,
    /// Identifier codes to create for the new item.
    #[serde(skip_serializing)]
    pub identifiers_data: Option<Codes>,
    pub inventory: Option<Uuid>,
    #[serde(skip_serializing)]
    pub inventory_data: Option<InventoryCreateParams>,
    pub name: Option<String>,
    /// A price to create for the new item; its `item` is always the new item.
    #[serde(skip_serializing)]
    pub price_data: Option<PriceCreateParams>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub variant: Option<bool>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for ItemCreateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "active" => FieldValue::present(&self.active),
            "description" => FieldValue::text(&self.description),
            "group" => FieldValue::present(&self.group),
            "group_data" => FieldValue::nested(&self.group_data),
            "identifiers_data" => FieldValue::nested(&self.identifiers_data),
            "inventory" => FieldValue::present(&self.inventory),
            "inventory_data" => FieldValue::nested(&self.inventory_data),
            "name" => FieldValue::text(&self.name),
            "price_data" => FieldValue::nested(&self.price_data),
            "type" => FieldValue::text(&self.kind),
            "variant" => FieldValue::present(&self.variant),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for ItemCreateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemUpdateParams {
    pub active: Option<bool>,
    pub description: Option<String>,
    pub group: Option<Uuid>,
    pub inventory: Option<Uuid>,
    pub name: Option<String>,
    pub variant: Option<bool>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for ItemUpdateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "active" => FieldValue::present(&self.active),
            "description" => FieldValue::text(&self.description),
            "group" => FieldValue::present(&self.group),
            "inventory" => FieldValue::present(&self.inventory),
            "name" => FieldValue::text(&self.name),
            "variant" => FieldValue::present(&self.variant),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for ItemUpdateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    pub active: Option<bool>,
    pub description: Option<String>,
    pub group: Option<Uuid>,
    pub inventory: Option<Uuid>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub variant: Option<bool>,
}

impl Fields for ItemFilter {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "active" => FieldValue::present(&self.active),
            "description" => FieldValue::text(&self.description),
            "group" => FieldValue::present(&self.group),
            "inventory" => FieldValue::present(&self.inventory),
            "name" => FieldValue::text(&self.name),
            "type" => FieldValue::text(&self.kind),
            "variant" => FieldValue::present(&self.variant),
            _ => FieldValue::Missing,
        }
    }
}

impl Entity for Item {
    const NAME: &'static str = "item";

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
impl Resource for Item {
    type CreateParams = ItemCreateParams;
    type UpdateParams = ItemUpdateParams;
    type Filter = ItemFilter;

    const CREATE_RULES: &'static [Rule] = &[
        Rule::new("description", &[Constraint::MaxLength(1024)]),
        Rule::new("group", &[Constraint::ExcludedWith("group_data")]),
        Rule::new("group_data", &[Constraint::Dive(GROUP_CREATE_RULES)]),
        Rule::new("identifiers_data", &[Constraint::Dive(CODE_RULES)]),
        Rule::new("inventory", &[Constraint::ExcludedWith("inventory_data")]),
        Rule::new("inventory_data", &[Constraint::Dive(INVENTORY_CREATE_RULES)]),
        Rule::new("name", &[Constraint::Required, Constraint::MaxLength(256)]),
        Rule::new("price_data", &[Constraint::Dive(PRICE_CREATE_RULES)]),
        Rule::new("type", &[Constraint::Required, Constraint::OneOf(ItemType::NAMES)]),
    ];
    const UPDATE_RULES: &'static [Rule] = &[
        Rule::new("description", &[Constraint::MaxLength(1024)]),
        Rule::new("name", &[Constraint::MaxLength(256)]),
    ];
    const FILTER_RULES: &'static [Rule] = &[
        Rule::new("description", &[Constraint::MaxLength(1024)]),
        Rule::new("name", &[Constraint::MaxLength(256)]),
        Rule::new("type", &[Constraint::OneOf(ItemType::NAMES)]),
    ];
    const EXPAND_RULES: &'static [Rule] = &[Rule::new(
        "expand",
        &[Constraint::OneOf(&["group", "identifiers", "inventory"])],
    )];

    fn repository(repos: &Repositories) -> &dyn Repository<Self> {
        repos.items.as_ref()
    }

    fn create_values(params: &ItemCreateParams) -> Result<Record, AppError> {
        let mut values = to_record(params)?;
        values.entry("active").or_insert(Value::Bool(true));
        values.entry("variant").or_insert(Value::Bool(false));
        Ok(values)
    }

    /// Nested `group_data` / `inventory_data` are created first and linked by id.
    async fn prepare_create(params: &mut ItemCreateParams, tenant: Uuid, repos: &Repositories) -> Result<(), AppError> {
        if let Some(data) = params.group_data.take() {
            let group = repos.groups.create(tenant, Group::create_values(&data)?).await?;
            tracing::debug!(group = ?group.id(), "created nested group");
            params.group = group.id();
        }
        if let Some(data) = params.inventory_data.take() {
            let inventory = repos.inventories.create(tenant, Inventory::create_values(&data)?).await?;
            tracing::debug!(inventory = ?inventory.id(), "created nested inventory");
            params.inventory = inventory.id();
        }
        Ok(())
    }

    /// Nested `identifiers_data` / `price_data` need the item's id, so they are written after it.
    async fn complete_create(
        &mut self,
        params: &mut ItemCreateParams,
        tenant: Uuid,
        repos: &Repositories,
    ) -> Result<(), AppError> {
        let Some(item) = self.id() else {
            return Ok(());
        };
        if let Some(codes) = params.identifiers_data.take() {
            let data = ItemIdentifiersCreateParams {
                codes,
                item: Some(item),
                expand: Vec::new(),
            };
            let identifiers = repos
                .item_identifiers
                .create(tenant, ItemIdentifiers::create_values(&data)?)
                .await?;
            tracing::debug!(item_identifiers = ?identifiers.id(), "created nested identifiers");
            self.identifiers = Expandable::new(identifiers.id());
        }
        if let Some(mut data) = params.price_data.take() {
            data.item = Some(item);
            let price = repos.prices.create(tenant, Price::create_values(&data)?).await?;
            tracing::debug!(price = ?price.id(), "created nested price");
        }
        Ok(())
    }

    async fn expand(&mut self, fields: &[String], tenant: Uuid, repos: &Repositories) -> Result<(), AppError> {
        if wants(fields, "group") {
            expand_one(&mut self.group, tenant, repos.groups.as_ref()).await?;
        }
        if wants(fields, "identifiers") {
            expand_one(&mut self.identifiers, tenant, repos.item_identifiers.as_ref()).await?;
        }
        if wants(fields, "inventory") {
            expand_one(&mut self.inventory, tenant, repos.inventories.as_ref()).await?;
        }
        Ok(())
    }

    async fn expand_list(
        rows: &mut [Self],
        fields: &[String],
        tenant: Uuid,
        repos: &Repositories,
    ) -> Result<(), AppError> {
        if wants(fields, "group") {
            let refs = rows.iter_mut().map(|i| &mut i.group).collect();
            expand_many(refs, tenant, repos.groups.as_ref()).await?;
        }
        if wants(fields, "identifiers") {
            let refs = rows.iter_mut().map(|i| &mut i.identifiers).collect();
            expand_many(refs, tenant, repos.item_identifiers.as_ref()).await?;
        }
        if wants(fields, "inventory") {
            let refs = rows.iter_mut().map(|i| &mut i.inventory).collect();
            expand_many(refs, tenant, repos.inventories.as_ref()).await?;
        }
        Ok(())
    }
}
