use crate::entity::Entity;
use crate::error::AppError;
use crate::extractors::{JsonParams, Tenant};
use crate::resources::{Inventory, ItemFilter, ListParams};
use crate::response::{ok, ListResponse};
use crate::service::validation::parse_id;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    response::IntoResponse,
};

/// GET /inventories/:id/items
pub async fn list_items(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    JsonParams(params): JsonParams<ListParams<ItemFilter>>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(Inventory::NAME, &id)?;
    let page = CrudService::list_inventory_items(&state.repos, tenant, id, params).await?;
    Ok(ok(ListResponse::new(page, uri.path())))
}
