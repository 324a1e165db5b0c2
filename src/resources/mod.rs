//! Resource declarations: entity shape, parameter types, rule tables, and expansion hooks.

mod currency;
mod groups;
mod inventories;
mod item_identifiers;
mod items;
mod prices;

pub use currency::CURRENCY_CODES;
pub use groups::{Group, GroupCreateParams, GroupFilter, GroupUpdateParams};
pub use inventories::{Inventory, InventoryCreateParams, InventoryFilter, InventoryUpdateParams};
pub use item_identifiers::{
    Codes, ItemIdentifiers, ItemIdentifiersCreateParams, ItemIdentifiersFilter, ItemIdentifiersUpdateParams,
};
pub use items::{Item, ItemCreateParams, ItemFilter, ItemType, ItemUpdateParams};
pub use prices::{Price, PriceCreateParams, PriceFilter, PriceUpdateParams};

use crate::entity::Entity;
use crate::error::AppError;
use crate::service::pagination::{PaginationParams, TimeRange};
use crate::service::validation::{FieldValue, Fields, Rule};
use crate::store::{to_record, Record, Repositories, Repository};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request parameter object: validated through `Fields`, persisted through `Serialize`.
pub trait Params: Fields + Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Relations the caller asked to have expanded in the response.
    fn expand(&self) -> &[String] {
        &[]
    }
}

#[async_trait]
pub trait Resource: Entity {
    type CreateParams: Params;
    type UpdateParams: Params;
    type Filter: Fields + Serialize + DeserializeOwned + Default + Send + Sync + 'static;

    const CREATE_RULES: &'static [Rule];
    /// Links to an owning resource that must be set on create and cannot change afterwards.
    const LINK_RULES: &'static [Rule] = &[];
    const UPDATE_RULES: &'static [Rule];
    const FILTER_RULES: &'static [Rule] = &[];
    /// `expand` restricted to this resource's expandable relations.
    const EXPAND_RULES: &'static [Rule];

    fn repository(repos: &Repositories) -> &dyn Repository<Self>;

    fn create_values(params: &Self::CreateParams) -> Result<Record, AppError> {
        to_record(params)
    }

    fn update_values(params: &Self::UpdateParams) -> Result<Record, AppError> {
        to_record(params)
    }

    fn filter_values(filter: &Self::Filter) -> Result<Record, AppError> {
        to_record(filter)
    }

    /// Runs after validation and before the row is written.
    async fn prepare_create(
        _params: &mut Self::CreateParams,
        _tenant: Uuid,
        _repos: &Repositories,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Runs once the row exists, for dependents that point back at it.
    async fn complete_create(
        &mut self,
        _params: &mut Self::CreateParams,
        _tenant: Uuid,
        _repos: &Repositories,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// Expand the named relations on one resource; a dangling id is a NotFound.
    async fn expand(&mut self, _fields: &[String], _tenant: Uuid, _repos: &Repositories) -> Result<(), AppError> {
        Ok(())
    }

    /// Expand the named relations across a page with one batched fetch per relation.
    async fn expand_list(
        _rows: &mut [Self],
        _fields: &[String],
        _tenant: Uuid,
        _repos: &Repositories,
    ) -> Result<(), AppError> {
        Ok(())
    }
}

pub(crate) fn wants(fields: &[String], name: &str) -> bool {
    fields.iter().any(|f| f == name)
}

/// List request: pagination, time ranges, expansion, and resource-specific filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams<F> {
    #[serde(flatten)]
    pub page: PaginationParams,
    pub created_at: Option<TimeRange>,
    pub updated_at: Option<TimeRange>,
    #[serde(default)]
    pub expand: Vec<String>,
    #[serde(flatten)]
    pub filter: F,
}

impl<F: Fields> Fields for ListParams<F> {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "limit" | "starting_after" | "ending_before" => self.page.field(name),
            "created_at" => FieldValue::present(&self.created_at),
            "updated_at" => FieldValue::present(&self.updated_at),
            "expand" => FieldValue::names(&self.expand),
            other => self.filter.field(other),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RetrieveParams {
    #[serde(default)]
    pub expand: Vec<String>,
}

impl Fields for RetrieveParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}
