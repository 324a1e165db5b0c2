//! Resource CRUD handlers, generic over the resource type.

use crate::error::AppError;
use crate::extractors::{JsonParams, Tenant};
use crate::resources::{ListParams, Resource, RetrieveParams};
use crate::response::{created, ok, ListResponse};
use crate::service::validation::parse_id;
use crate::service::CrudService;
use crate::state::AppState;
use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    OriginalUri(uri): OriginalUri,
    JsonParams(params): JsonParams<ListParams<R::Filter>>,
) -> Result<impl IntoResponse, AppError> {
    let page = CrudService::list::<R>(&state.repos, tenant, params).await?;
    Ok(ok(ListResponse::new(page, uri.path())))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    JsonParams(params): JsonParams<R::CreateParams>,
) -> Result<impl IntoResponse, AppError> {
    let row = CrudService::create::<R>(&state.repos, tenant, params).await?;
    Ok(created(row))
}

pub async fn retrieve<R: Resource>(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
    JsonParams(params): JsonParams<RetrieveParams>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(R::NAME, &id)?;
    let row = CrudService::retrieve::<R>(&state.repos, tenant, id, params).await?;
    Ok(ok(row))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
    JsonParams(params): JsonParams<R::UpdateParams>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(R::NAME, &id)?;
    let row = CrudService::update::<R>(&state.repos, tenant, id, params).await?;
    Ok(ok(row))
}

pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Tenant(tenant): Tenant,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(R::NAME, &id)?;
    CrudService::delete::<R>(&state.repos, tenant, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
