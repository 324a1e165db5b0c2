//! Router assembly.

mod common;
mod resources;

pub use common::common_routes;
pub use resources::{resource_routes_v1, unknown_route};

use crate::state::AppState;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// The full application: common routes, resources under `/v1`, the unknown-route fallback,
/// a request body cap, and request tracing.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .merge(common_routes())
        .nest("/v1", resource_routes_v1(state))
        .fallback(unknown_route)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
