//! HTTP layer - health endpoint for container orchestration.

pub mod routes;
pub mod state;

pub use routes::{create_router, serve};
pub use state::AppState;
