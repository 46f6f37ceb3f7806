use axum::extract::{Query, State};
use axum::extract::rejection::QueryRejection;
use axum::Json;

use super::DateRangeQuery;
use crate::error::ApiResult;
use crate::AppState;
use adpulse_common::db::aggregates::platform_summaries;
use adpulse_common::db::{MetricsFilter, PlatformSummary};

/// GET /summary/platforms
pub async fn platform_summary(
    State(state): State<AppState>,
    query: Result<Query<DateRangeQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<PlatformSummary>>> {
    let Query(range) = query?;
    let filter = MetricsFilter::date_range(range.start_date, range.end_date);

    let summaries = platform_summaries(state.storage.pool(), &filter).await?;
    Ok(Json(summaries))
}
