//! Generic CRUD orchestration: validate, persist, trim, expand. Every call is tenant-scoped.

use super::pagination::{apply_limit, resolve_cursors, PAGINATION_RULES};
use super::validation::RequestValidator;
use crate::entity::Entity;
use crate::error::AppError;
use crate::resources::{Inventory, Item, ItemFilter, ListParams, Params, Resource, RetrieveParams};
use crate::store::{ListQuery, Repositories};
use uuid::Uuid;

/// One page of a list call.
#[derive(Debug)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
}

pub struct CrudService;

impl CrudService {
    pub async fn create<R: Resource>(
        repos: &Repositories,
        tenant: Uuid,
        mut params: R::CreateParams,
    ) -> Result<R, AppError> {
        RequestValidator::check(&params, &[R::CREATE_RULES, R::LINK_RULES, R::EXPAND_RULES])?;
        R::prepare_create(&mut params, tenant, repos).await?;
        let values = R::create_values(&params)?;
        let mut row = R::repository(repos).create(tenant, values).await?;
        tracing::debug!(resource = R::NAME, id = ?row.id(), "created");
        row.complete_create(&mut params, tenant, repos).await?;
        row.expand(params.expand(), tenant, repos).await?;
        Ok(row)
    }

    /// Fetch one row. With `omit_base` the identity fields are cleared, for callers that only
    /// need to know the row exists.
    pub async fn get<R: Resource>(repos: &Repositories, tenant: Uuid, id: Uuid, omit_base: bool) -> Result<R, AppError> {
        let mut row = R::repository(repos).get(id, tenant).await?;
        if omit_base {
            row.base_mut().clear();
        }
        Ok(row)
    }

    pub async fn retrieve<R: Resource>(
        repos: &Repositories,
        tenant: Uuid,
        id: Uuid,
        params: RetrieveParams,
    ) -> Result<R, AppError> {
        RequestValidator::check(&params, &[R::EXPAND_RULES])?;
        let mut row = Self::get::<R>(repos, tenant, id, false).await?;
        row.expand(&params.expand, tenant, repos).await?;
        Ok(row)
    }

    pub async fn list<R: Resource>(
        repos: &Repositories,
        tenant: Uuid,
        params: ListParams<R::Filter>,
    ) -> Result<Page<R>, AppError> {
        RequestValidator::check(&params, &[PAGINATION_RULES, R::FILTER_RULES, R::EXPAND_RULES])?;
        let repo = R::repository(repos);
        let cursors = resolve_cursors::<R, _>(repo, tenant, &params.page).await?;
        let limit = params.page.limit();
        let query = ListQuery {
            tenant,
            filters: R::filter_values(&params.filter)?,
            created_at: params.created_at,
            updated_at: params.updated_at,
            cursors,
            limit: limit + 1,
        };
        let rows = repo.list(&query).await?;
        let (mut data, has_more) = apply_limit(rows, limit, params.page.is_backward());
        tracing::debug!(resource = R::NAME, count = data.len(), has_more, "listed");
        R::expand_list(&mut data, &params.expand, tenant, repos).await?;
        Ok(Page { data, has_more })
    }

    pub async fn update<R: Resource>(
        repos: &Repositories,
        tenant: Uuid,
        id: Uuid,
        params: R::UpdateParams,
    ) -> Result<R, AppError> {
        Self::get::<R>(repos, tenant, id, true).await?;
        RequestValidator::check(&params, &[R::UPDATE_RULES, R::EXPAND_RULES])?;
        let values = R::update_values(&params)?;
        let mut row = R::repository(repos).update(id, tenant, values).await?;
        row.expand(params.expand(), tenant, repos).await?;
        Ok(row)
    }

    pub async fn delete<R: Resource>(repos: &Repositories, tenant: Uuid, id: Uuid) -> Result<(), AppError> {
        Self::get::<R>(repos, tenant, id, true).await?;
        R::repository(repos).delete(id, tenant).await?;
        tracing::debug!(resource = R::NAME, id = %id, "deleted");
        Ok(())
    }

    /// Items stocked in one inventory. The inventory must exist for the tenant.
    pub async fn list_inventory_items(
        repos: &Repositories,
        tenant: Uuid,
        inventory: Uuid,
        mut params: ListParams<ItemFilter>,
    ) -> Result<Page<Item>, AppError> {
        Self::get::<Inventory>(repos, tenant, inventory, true).await?;
        params.filter.inventory = Some(inventory);
        Self::list::<Item>(repos, tenant, params).await
    }
}
