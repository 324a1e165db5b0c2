//! Tenant id from the `X-Tenant-ID` header, set by the upstream API-key authenticator.

use crate::error::AppError;
use crate::messages;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

pub const TENANT_ID_HEADER: &str = "X-Tenant-ID";

/// Caller's account. Requests without a valid one are rejected with 401.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tenant(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(TENANT_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .map(Tenant)
            .ok_or_else(|| AppError::Unauthenticated(messages::tenant_missing(TENANT_ID_HEADER)))
    }
}
