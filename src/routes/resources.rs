//! Resource routes: `/{resource}` and `/{resource}/:id` per resource, plus nested listings.

use crate::error::{ApiError, AppError};
use crate::handlers::inventories::list_items;
use crate::handlers::resource::{create, delete, list, retrieve, update};
use crate::messages;
use crate::resources::{Group, Inventory, Item, ItemIdentifiers, Price, Resource};
use crate::state::AppState;
use axum::{
    http::{Method, Uri},
    routing::get,
    Router,
};

fn resource_routes<R: Resource>(router: Router<AppState>, segment: &str) -> Router<AppState> {
    router
        .route(&format!("/{}", segment), get(list::<R>).post(create::<R>))
        .route(
            &format!("/{}/:id", segment),
            get(retrieve::<R>).put(update::<R>).delete(delete::<R>),
        )
}

/// All resource routes, meant to be nested under `/v1`.
pub fn resource_routes_v1(state: AppState) -> Router {
    let router = Router::new();
    let router = resource_routes::<Group>(router, "groups");
    let router = resource_routes::<Inventory>(router, "inventories");
    let router = resource_routes::<Item>(router, "items");
    let router = resource_routes::<ItemIdentifiers>(router, "item_identifiers");
    let router = resource_routes::<Price>(router, "prices");
    router
        .route("/inventories/:id/items", get(list_items))
        .with_state(state)
}

/// Fallback for paths no route matches.
pub async fn unknown_route(method: Method, uri: Uri) -> AppError {
    AppError::UnknownRoute(ApiError::invalid_request(messages::route_unknown(method.as_str(), uri.path())))
}
