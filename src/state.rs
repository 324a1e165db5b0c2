//! Shared application state for all routes.

use crate::store::Repositories;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub repos: Arc<Repositories>,
}

impl AppState {
    pub fn new(repos: Repositories) -> Self {
        AppState {
            repos: Arc::new(repos),
        }
    }
}
