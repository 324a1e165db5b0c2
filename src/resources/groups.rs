use super::{wants, Params, Resource};
use crate::entity::{Base, Column, ColumnType, Entity, Expandable, Table};
use crate::error::AppError;
use crate::service::expand::{expand_many, expand_one};
use crate::service::validation::{Constraint, FieldValue, Fields, Rule};
use crate::store::{Repositories, Repository};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static TABLE: Table = Table {
    name: "groups",
    columns: &[
        Column::new("description", ColumnType::Text),
        Column::new("name", ColumnType::Text),
        Column::new("parent_group", ColumnType::Uuid),
    ],
    derived: &[],
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(flatten)]
    pub base: Base,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent_group: Expandable<Group>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupCreateParams {
    pub description: Option<String>,
    pub name: Option<String>,
    pub parent_group: Option<Uuid>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for GroupCreateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "description" => FieldValue::text(&self.description),
            "name" => FieldValue::text(&self.name),
            "parent_group" => FieldValue::present(&self.parent_group),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for GroupCreateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupUpdateParams {
    pub description: Option<String>,
    pub name: Option<String>,
    pub parent_group: Option<Uuid>,
    #[serde(default, skip_serializing)]
    pub expand: Vec<String>,
}

impl Fields for GroupUpdateParams {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "description" => FieldValue::text(&self.description),
            "name" => FieldValue::text(&self.name),
            "parent_group" => FieldValue::present(&self.parent_group),
            "expand" => FieldValue::names(&self.expand),
            _ => FieldValue::Missing,
        }
    }
}

impl Params for GroupUpdateParams {
    fn expand(&self) -> &[String] {
        &self.expand
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GroupFilter {
    pub description: Option<String>,
    pub name: Option<String>,
    pub parent_group: Option<Uuid>,
}

impl Fields for GroupFilter {
    fn field(&self, name: &str) -> FieldValue<'_> {
        match name {
            "description" => FieldValue::text(&self.description),
            "name" => FieldValue::text(&self.name),
            "parent_group" => FieldValue::present(&self.parent_group),
            _ => FieldValue::Missing,
        }
    }
}

pub(crate) const GROUP_CREATE_RULES: &[Rule] = &[
    Rule::new("description", &[Constraint::MaxLength(1024)]),
    Rule::new("name", &[Constraint::Required, Constraint::MaxLength(64)]),
];

impl Entity for Group {
    const NAME: &'static str = "group";

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
impl Resource for Group {
    type CreateParams = GroupCreateParams;
    type UpdateParams = GroupUpdateParams;
    type Filter = GroupFilter;

    const CREATE_RULES: &'static [Rule] = GROUP_CREATE_RULES;
    const UPDATE_RULES: &'static [Rule] = &[
        Rule::new("description", &[Constraint::MaxLength(1024)]),
        Rule::new("name", &[Constraint::MaxLength(64)]),
    ];
    const FILTER_RULES: &'static [Rule] = &[
        Rule::new("description", &[Constraint::MaxLength(1024)]),
        Rule::new("name", &[Constraint::MaxLength(64)]),
    ];
    const EXPAND_RULES: &'static [Rule] = &[Rule::new("expand", &[Constraint::OneOf(&["parent_group"])])];

    fn repository(repos: &Repositories) -> &dyn Repository<Self> {
        repos.groups.as_ref()
    }

    async fn expand(&mut self, fields: &[String], tenant: Uuid, repos: &Repositories) -> Result<(), AppError> {
        if wants(fields, "parent_group") {
            expand_one(&mut self.parent_group, tenant, repos.groups.as_ref()).await?;
        }
        Ok(())
    }

    async fn expand_list(
        rows: &mut [Self],
        fields: &[String],
        tenant: Uuid,
        repos: &Repositories,
    ) -> Result<(), AppError> {
        if wants(fields, "parent_group") {
            let refs = rows.iter_mut().map(|g| &mut g.parent_group).collect();
            expand_many(refs, tenant, repos.groups.as_ref()).await?;
        }
        Ok(())
    }
}
