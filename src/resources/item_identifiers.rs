use super::{wants, Item, Params, Resource};
use crate::entity::{Base, Column, ColumnType, Entity, Expandable, Table};
use crate::error::AppError;
use crate::service::expand::{expand_many, expand_one};
use crate::service::validation::{Constraint, FieldValue, Fields, Rule};
use crate::store::{Repositories, Repository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static TABLE: Table = Table {
    name: "item_identifiers",
    columns: &[
        Column::new("ean", ColumnType::Text),
        Column::new("gtin", ColumnType::Text),
        Column::new("isbn", ColumnType::Text),
        Column::new("jan", ColumnType::Text),
        Column::new("mpn", ColumnType::Text),
        Column::new("nsn", ColumnType::Text),
        Column::new("upc", ColumnType::Text),
        Column::new("qr", ColumnType::Text),
        Column::new("sku", ColumnType::Text),
        Column::new("item", ColumnType::Uuid),
    ],
    derived: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemIdentifiers {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub ean: Option<String>,
    #[serde(default)]
    pub gtin: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub jan: Option<String>,
    #[serde(default)]
    pub mpn: Option<String>,
    #[serde(default)]
    pub nsn: Option<String>,
    #[serde(default)]
    pub upc: Option<String>,
    #[serde(default)]
    pub qr: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub item: Expandable<Item>,
}

/// The identifier codes shared by create and update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Codes {
    pub ean: Option<String>,
    pub gtin: Option<String>,
    pub isbn: Option<String>,
    pub jan: Option<String>,
    pub mpn: Option<String>,
    pub nsn: Option<String>,
    pub upc: Option<String>,
    pub qr: Option<String>,
    pub sku: Option<String>,
}

impl Fields for Codes {
    fn field(&self, name: &str) -> FieldValue<'_> {
        let v = match name {
            "ean" => &self.ean,
            "gtin" => &self.gtin,
            "isbn" => &self.isbn,
            "jan" => &self.jan,
            "mpn" => &self.mpn,
            "nsn" => &self.nsn,
            "upc" => &self.upc,
            "qr" => &self.qr,
            "sku" => &self.sku,
            _ => return FieldValue::Missing,
        };
        FieldValue::text(v)
    }
}

pub(crate) const CODE_RULES: &[Rule] = &[
    Rule::new("ean", &[Constraint::Lengths(&[8, 12, 13, 14])]),
    Rule::new("gtin", &[Constraint::Lengths(&[8, 12, 13, 14])]),
    Rule::new("isbn", &[Constraint::Lengths(&[10, 13])]),
    Rule::new("jan", &[Constraint::Lengths(&[8, 13])]),
    Rule::new("nsn", &[Constraint::Lengths(&[13])]),
    Rule::new("upc", &[Constraint::Lengths(&[12])]),
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemIdentifiersCreateParams {
    #[serde(flatten)]
    pub codes: Codes,
    pub item: Option<Uuid>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for ItemIdentifiersCreateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "item" => FieldValue::present(&self.item),
            "expand" => FieldValue::names(&self.expand),
            other => self.codes.field(other),
        }
    }
}

impl Params for ItemIdentifiersCreateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemIdentifiersUpdateParams {
    #[serde(flatten)]
    pub codes: Codes,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for ItemIdentifiersUpdateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "expand" => FieldValue::names(&self.expand),
            other => self.codes.field(other),
        }
    }
}

impl Params for ItemIdentifiersUpdateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ItemIdentifiersFilter {
    pub item: Option<Uuid>,
}

impl Fields for ItemIdentifiersFilter {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "item" => FieldValue::present(&self.item),
            _ => FieldValue::Missing,
        }
    }
}

impl Entity for ItemIdentifiers {
    const NAME: &'static str = "item_identifiers";

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
impl Resource for ItemIdentifiers {
    type CreateParams = ItemIdentifiersCreateParams;
    type UpdateParams = ItemIdentifiersUpdateParams;
    type Filter = ItemIdentifiersFilter;

    const CREATE_RULES: &'static [Rule] = CODE_RULES;
    const LINK_RULES: &'static [Rule] = &[Rule::new("item", &[Constraint::Required])];
    const UPDATE_RULES: &'static [Rule] = CODE_RULES;
    const EXPAND_RULES: &'static [Rule] = &[Rule::new("expand", &[Constraint::OneOf(&["item"])])];

    fn repository(repos: &Repositories) -> &dyn Repository<Self> {
        repos.item_identifiers.as_ref()
    }

    async fn expand(&mut self, fields: &[String], tenant: Uuid, repos: &Repositories) -> Result<(), AppError> {
        if wants(fields, "item") {
            expand_one(&mut self.item, tenant, repos.items.as_ref()).await?;
        }
        Ok(())
    }

    async fn expand_list(
        rows: &mut [Self],
        fields: &[String],
        tenant: Uuid,
        repos: &Repositories,
    ) -> Result<(), AppError> {
        if wants(fields, "item") {
            let refs = rows.iter_mut().map(|r| &mut r.item).collect();
            expand_many(refs, tenant, repos.items.as_ref()).await?;
        }
        Ok(())
    }
}
