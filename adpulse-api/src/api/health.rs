//! Liveness and database connectivity

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub db_connection: &'static str,
    pub module: &'static str,
    pub version: &'static str,
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "AdPulse Metrics API is running" }))
}

/// GET /health
///
/// Always 200; a failing store query reports `degraded` / `error`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, db_connection) = match state.storage.row_count().await {
        Ok(_) => ("ok", "ok"),
        Err(e) => {
            warn!("Health check database query failed: {}", e);
            ("degraded", "error")
        }
    };

    Json(HealthResponse {
        status,
        db_connection,
        module: "adpulse-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
