use super::currency::CURRENCY_CODES;
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
    name: "prices",
    columns: &[
        Column::new("amount", ColumnType::Int),
        Column::new("currency", ColumnType::Enum("currency")),
        Column::new("item", ColumnType::Uuid),
    ],
    derived: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(flatten)]
    pub base: Base,
    /// Smallest currency unit.
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub item: Expandable<Item>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriceCreateParams {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub item: Option<Uuid>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for PriceCreateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "amount" => FieldValue::int(self.amount),
            "currency" => FieldValue::text(&self.currency),
            "item" => FieldValue::present(&self.item),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for PriceCreateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriceUpdateParams {
    pub amount: Option<i64>,
    pub currency: Option<String>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for PriceUpdateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "amount" => FieldValue::int(self.amount),
            "currency" => FieldValue::text(&self.currency),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for PriceUpdateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriceFilter {
    pub currency: Option<String>,
    pub item: Option<Uuid>,
}

impl Fields for PriceFilter {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "currency" => FieldValue::text(&self.currency),
            "item" => FieldValue::present(&self.item),
            _ => FieldValue::Missing,
        }
    }
}

/// Amount and currency of a new price. Also applied to prices created inline with an item.
pub(crate) const PRICE_CREATE_RULES: &[Rule] = &[
    Rule::new("amount", &[Constraint::Required, Constraint::Gte(0)]),
    Rule::new("currency", &[Constraint::Required, Constraint::OneOf(CURRENCY_CODES)]),
];

impl Entity for Price {
    const NAME: &'static str = "price";

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
impl Resource for Price {
    type CreateParams = PriceCreateParams;
    type UpdateParams = PriceUpdateParams;
    type Filter = PriceFilter;

    const CREATE_RULES: &'static [Rule] = PRICE_CREATE_RULES;
    const LINK_RULES: &'static [Rule] = &[Rule::new("item", &[Constraint::Required])];
    const UPDATE_RULES: &'static [Rule] = &[
        Rule::new("amount", &[Constraint::Gte(0)]),
        Rule::new("currency", &[Constraint::OneOf(CURRENCY_CODES)]),
    ];
    const FILTER_RULES: &'static [Rule] = &[Rule::new("currency", &[Constraint::OneOf(CURRENCY_CODES)])];
    const EXPAND_RULES: &'static [Rule] = &[Rule::new("expand", &[Constraint::OneOf(&["item"])])];

    fn repository(repos: &Repositories) -> &dyn Repository<Self> {
        repos.prices.as_ref()
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
            let refs = rows.iter_mut().map(|p| &mut p.item).collect();
            expand_many(refs, tenant, repos.items.as_ref()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::service::validation::RequestValidator;

    fn params(currency: &str) -> PriceCreateParams {
        PriceCreateParams {
            amount: Some(100),
            currency: Some(currency.to_string()),
            item: Some(Uuid::new_v4()),
            expand: Vec::new(),
        }
    }

    fn create_tables() -> [&'static [Rule]; 2] {
        [Price::CREATE_RULES, Price::LINK_RULES]
    }

    #[test]
    fn accepts_any_active_iso_code() {
        for code in ["AED", "ARS", "ILS", "THB", "UAH", "VND", "EUR"] {
            assert!(
                RequestValidator::validate(&params(code), &create_tables()).is_none(),
                "{} rejected",
                code
            );
        }
    }

    #[test]
    fn rejects_unknown_and_lowercase_codes() {
        for code in ["ABC", "eur", "EURO"] {
            let list = RequestValidator::validate(&params(code), &create_tables()).unwrap();
            assert_eq!(list.errors.len(), 1);
            assert_eq!(list.errors[0].code, Some(ErrorCode::ParameterInvalid));
            assert_eq!(list.errors[0].message, "Parameter invalid: 'currency'.");
        }
    }

    #[test]
    fn update_and_filter_use_the_same_codes() {
        let update = PriceUpdateParams {
            currency: Some("VND".to_string()),
            ..PriceUpdateParams::default()
        };
        assert!(RequestValidator::validate(&update, &[Price::UPDATE_RULES]).is_none());
        let filter = PriceFilter {
            currency: Some("XYZ".to_string()),
            item: None,
        };
        assert!(RequestValidator::validate(&filter, &[Price::FILTER_RULES]).is_some());
    }

    #[test]
    fn item_is_required_on_create() {
        let mut p = params("USD");
        p.item = None;
        let list = RequestValidator::validate(&p, &create_tables()).unwrap();
        assert_eq!(list.errors.len(), 1);
        assert_eq!(list.errors[0].param.as_deref(), Some("item"));
    }
}
