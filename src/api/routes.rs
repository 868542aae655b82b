//! Health endpoint routes.

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use super::AppState;
use crate::errors::{AppError, AppResult};

/// Create the router serving `/` and `/health`.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` flips to true.
pub async fn serve(
    addr: &str,
    state: AppState,
    mut shutdown: watch::Receiver<bool>,
) -> AppResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Health endpoint on http://{}/health", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|e| AppError::internal(format!("Health server error: {}", e)))
}

async fn root() -> &'static str {
    "shift-bot"
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    state: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    backend: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>, backend: Option<&'static str>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                backend,
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                backend,
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Database and state store connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = ServiceStatus::from_result(state.database.ping().await, None);
    let store = ServiceStatus::from_result(
        state.state_store.ping().await,
        Some(state.state_store.backend()),
    );

    let all_healthy = database.is_healthy() && store.is_healthy();
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if all_healthy { "healthy" } else { "degraded" },
            services: ServiceHealth {
                database,
                state: store,
            },
        }),
    )
}
