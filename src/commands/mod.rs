//! Commands module - CLI command implementations.
//!
//! Each command is implemented in its own module for separation of concerns.

pub mod jobs;
pub mod migrate;
pub mod run;
pub mod seed;

use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Database, MemoryStateStore, RedisStateStore, StateStore};

/// Connect to the database, applying pending migrations.
pub(crate) async fn connect_database(config: &Config) -> AppResult<Database> {
    tracing::info!("Connecting to database...");
    Ok(Database::connect(config).await?)
}

/// Redis when it answers, otherwise the process-local fallback.
pub(crate) async fn connect_state(config: &Config) -> (Option<Cache>, Arc<dyn StateStore>) {
    match Cache::try_connect(config).await {
        Ok(cache) => (
            Some(cache.clone()),
            Arc::new(RedisStateStore::new(cache)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, using in-memory state");
            (None, Arc::new(MemoryStateStore::new()))
        }
    }
}
