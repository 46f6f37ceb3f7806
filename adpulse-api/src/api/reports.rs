//! Report generation and listing

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ApiError, ApiResult};
use crate::report::{self, ReportFile};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub send_email: bool,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report_path: PathBuf,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListReportsQuery {
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub reports: Vec<ReportFile>,
}

/// POST /reports/generate
pub async fn generate_report(
    State(state): State<AppState>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<Json<ReportResponse>> {
    let Json(request) = body?;

    if request.start_date > request.end_date {
        return Err(ApiError::BadRequest(
            "start_date must not be after end_date".to_string(),
        ));
    }
    let recipient = request.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
    if request.send_email && recipient.is_none() {
        return Err(ApiError::BadRequest(
            "Email address required when send_email is true".to_string(),
        ));
    }

    let report_path = report::build_report(
        &state.storage,
        state.generator.as_deref(),
        request.start_date,
        request.end_date,
        &state.reports_dir,
    )
    .await?;

    if let Some(to) = recipient.filter(|_| request.send_email) {
        report::send_report_via_email(to, &report_path);
    }

    Ok(Json(ReportResponse {
        report_path,
        message: "Report generated successfully".to_string(),
    }))
}

/// GET /reports/list
pub async fn list_reports(
    State(state): State<AppState>,
    query: Result<Query<ListReportsQuery>, QueryRejection>,
) -> ApiResult<Json<ReportListResponse>> {
    let Query(query) = query?;
    let directory = query.directory.unwrap_or_else(|| state.reports_dir.clone());

    let reports = report::list_reports(&directory)?;
    Ok(Json(ReportListResponse { reports }))
}
