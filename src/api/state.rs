//! Application state shared by HTTP handlers.

use std::sync::Arc;

use crate::infra::{Database, StateStore};

/// Dependencies probed by the health endpoint.
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    pub database: Arc<Database>,
    /// Conversation state backend (Redis or in-memory)
    pub state_store: Arc<dyn StateStore>,
}

impl AppState {
    pub fn new(database: Arc<Database>, state_store: Arc<dyn StateStore>) -> Self {
        Self {
            database,
            state_store,
        }
    }
}
