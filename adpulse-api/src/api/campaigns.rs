//! Campaign-level endpoints

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::DateRangeQuery;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use adpulse_common::db::aggregates::{campaign_detail as fetch_campaign_detail, campaign_summaries};
use adpulse_common::db::{CampaignDetail, CampaignSummary, MetricsFilter};

#[derive(Debug, Default, Deserialize)]
pub struct CampaignSummaryQuery {
    pub platform: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /campaigns/summary
pub async fn campaign_summary(
    State(state): State<AppState>,
    query: Result<Query<CampaignSummaryQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<CampaignSummary>>> {
    let Query(query) = query?;
    let filter = MetricsFilter {
        platform: query.platform,
        campaign_id: None,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    Ok(Json(campaign_summaries(state.storage.pool(), &filter).await?))
}

/// GET /campaigns/:campaign_id/detail
pub async fn campaign_detail(
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<CampaignDetail>> {
    let Query(range) = query?;
    let filter = MetricsFilter::date_range(range.start_date, range.end_date);

    fetch_campaign_detail(state.storage.pool(), &campaign_id, &filter)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Campaign not found".to_string()))
}
