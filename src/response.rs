//! Response envelopes.

use crate::service::Page;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// List envelope: one page, whether more rows follow, and the path that was listed.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub has_more: bool,
    pub url: String,
}

impl<T> ListResponse<T> {
    pub fn new(page: Page<T>, url: impl Into<String>) -> Self {
        ListResponse {
            data: page.data,
            has_more: page.has_more,
            url: url.into(),
        }
    }
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}
