//! Aggregation result shapes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metrics::DerivedRatios;

/// Per-platform row of `StorageManager::fetch_summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlatformTotals {
    pub platform: String,
    pub rows_ingested: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
}

/// Whole-table aggregation of `StorageManager::fetch_totals`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Totals {
    pub rows_ingested: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub total_spend: f64,
    pub total_clicks: i64,
    pub total_impressions: i64,
    pub total_conversions: i64,
    pub total_revenue: f64,
    #[serde(flatten)]
    pub ratios: DerivedRatios,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub campaign_id: String,
    pub campaign_name: String,
    pub platform: String,
    pub total_spend: f64,
    pub total_clicks: i64,
    pub total_impressions: i64,
    pub total_conversions: i64,
    pub total_revenue: f64,
    #[serde(flatten)]
    pub ratios: DerivedRatios,
}

/// One day of summed metrics; `platform` is set when grouped or filtered by platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTimeseriesPoint {
    pub date: NaiveDate,
    pub platform: Option<String>,
    pub campaign_id: Option<String>,
    pub spend: f64,
    pub clicks: i64,
    pub impressions: i64,
    pub conversions: i64,
    pub revenue: f64,
    pub roas: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub summary: CampaignSummary,
    pub timeseries: Vec<DailyTimeseriesPoint>,
}
