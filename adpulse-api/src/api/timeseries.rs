use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

use crate::error::ApiResult;
use crate::AppState;
use adpulse_common::db::aggregates::daily_timeseries as fetch_daily_timeseries;
use adpulse_common::db::{DailyTimeseriesPoint, MetricsFilter};

/// GET /timeseries/daily
///
/// Accepts every [`MetricsFilter`] field as a query parameter.
pub async fn daily_timeseries(
    State(state): State<AppState>,
    query: Result<Query<MetricsFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<DailyTimeseriesPoint>>> {
    let Query(filter) = query?;
    Ok(Json(fetch_daily_timeseries(state.storage.pool(), &filter).await?))
}
