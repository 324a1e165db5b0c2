//! Inventory API: a multi-tenant CRUD backend library with cursor pagination, field
//! expansion, and declarative request validation.

pub mod case;
pub mod config;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod messages;
pub mod resources;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError};
pub use routes::app;
pub use service::CrudService;
pub use state::AppState;
pub use store::Repositories;
