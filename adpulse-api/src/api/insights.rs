//! AI insight endpoints
//!
//! A failed or unconfigured text generator does not fail the request: the
//! response carries placeholder text and `available: false`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiResult;
use crate::insights::{account_health_summary, roas_drop_explanation, InsightError};
use crate::AppState;

pub const INSIGHT_PLACEHOLDER: &str = "AI insights unavailable.";

#[derive(Debug, Deserialize)]
pub struct RoasDropQuery {
    /// Platform display name as stored ("Google Ads")
    pub platform: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AccountHealthQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub analysis: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InsightResponse {
    /// Storage failures propagate; generation failures become a placeholder
    fn from_result(
        platform: Option<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        result: Result<String, InsightError>,
    ) -> ApiResult<Self> {
        let (analysis, available, error) = match result {
            Ok(text) => (text, true, None),
            Err(InsightError::Storage(e)) => return Err(e.into()),
            Err(e) => {
                warn!("Insight generation failed: {}", e);
                (INSIGHT_PLACEHOLDER.to_string(), false, Some(e.to_string()))
            }
        };

        Ok(Self {
            platform,
            start_date,
            end_date,
            analysis,
            available,
            error,
        })
    }
}

/// GET /insights/roas-drop
pub async fn roas_drop(
    State(state): State<AppState>,
    query: Result<Query<RoasDropQuery>, QueryRejection>,
) -> ApiResult<Json<InsightResponse>> {
    let Query(query) = query?;

    let result = roas_drop_explanation(
        &state.storage,
        state.generator.as_deref(),
        &query.platform,
        query.start_date,
        query.end_date,
    )
    .await;

    InsightResponse::from_result(Some(query.platform), query.start_date, query.end_date, result)
        .map(Json)
}

/// GET /insights/account-health
pub async fn account_health(
    State(state): State<AppState>,
    query: Result<Query<AccountHealthQuery>, QueryRejection>,
) -> ApiResult<Json<InsightResponse>> {
    let Query(query) = query?;

    let result = account_health_summary(
        &state.storage,
        state.generator.as_deref(),
        query.start_date,
        query.end_date,
    )
    .await;

    InsightResponse::from_result(None, query.start_date, query.end_date, result).map(Json)
}
