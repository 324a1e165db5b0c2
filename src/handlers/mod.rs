//! HTTP handlers.

pub mod inventories;
pub mod resource;
