//! The resource-access engine: validation, cursor pagination, field expansion, and CRUD
//! orchestration.

mod crud;
pub mod expand;
pub mod pagination;
pub mod validation;

pub use crud::{CrudService, Page};
pub use validation::RequestValidator;
