//! Request extractors.

pub mod json;
pub mod tenant;

pub use json::JsonParams;
pub use tenant::{Tenant, TENANT_ID_HEADER};
