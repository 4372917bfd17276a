//! Liveness and readiness handlers

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::db;
use crate::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub app: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: String,
    pub version: &'static str,
    pub database: &'static str,
    pub cache: CacheStats,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(status))
        .route("/health", get(health))
}

/// Liveness: the process is up and serving
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        app: state.config.app_name.clone(),
        version: VERSION,
    })
}

/// Readiness: database reachable, plus cache statistics
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, database) = match db::ping(&state.db).await {
        Ok(()) => (StatusCode::OK, "ok", "ok"),
        Err(e) => {
            tracing::warn!("Health check database ping failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "error")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            app: state.config.app_name.clone(),
            version: VERSION,
            database,
            cache: state.cache.stats(),
        }),
    )
}
