//! adpulse-api library: metrics HTTP API, AI insights and reports

use axum::routing::{get, post};
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use adpulse_common::StorageManager;
use llm::TextGeneration;

pub mod anomaly;
pub mod api;
pub mod error;
pub mod format;
pub mod insights;
pub mod llm;
pub mod report;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub storage: StorageManager,
    /// `None` when no provider is configured; insights then degrade
    pub generator: Option<Arc<dyn TextGeneration>>,
    /// Where generated reports are written and listed from by default
    pub reports_dir: PathBuf,
}

impl AppState {
    pub fn new(
        storage: StorageManager,
        generator: Option<Arc<dyn TextGeneration>>,
        reports_dir: PathBuf,
    ) -> Self {
        Self {
            storage,
            generator,
            reports_dir,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/summary/platforms", get(api::platform_summary))
        .route("/campaigns/summary", get(api::campaign_summary))
        .route("/campaigns/:campaign_id/detail", get(api::campaign_detail))
        .route("/timeseries/daily", get(api::daily_timeseries))
        .route("/insights/roas-drop", get(api::roas_drop))
        .route("/insights/account-health", get(api::account_health))
        .route("/reports/generate", post(api::generate_report))
        .route("/reports/list", get(api::list_reports))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
