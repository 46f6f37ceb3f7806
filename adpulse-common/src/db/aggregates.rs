//! Filtered grouped-sum queries backing the HTTP API and reports
//!
//! Date bounds are inclusive and compared as `YYYY-MM-DD` text against the
//! stored `event_date`. No matching rows yields an empty collection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::metrics::{calc_rate, DerivedRatios};
use super::models::{CampaignDetail, CampaignSummary, DailyTimeseriesPoint, PlatformSummary};
use crate::record::EVENT_DATE_FORMAT;
use crate::{Error, Result};

const METRIC_SUMS: &str = "COALESCE(SUM(spend), 0.0) AS total_spend, \
     COALESCE(SUM(clicks), 0) AS total_clicks, \
     COALESCE(SUM(impressions), 0) AS total_impressions, \
     COALESCE(SUM(conversions), 0) AS total_conversions, \
     COALESCE(SUM(revenue), 0.0) AS total_revenue";

/// Optional filters shared by every aggregation endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsFilter {
    /// Platform display name as stored ("Google Ads")
    pub platform: Option<String>,
    pub campaign_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MetricsFilter {
    pub fn date_range(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date,
            end_date,
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_campaign(mut self, campaign_id: impl Into<String>) -> Self {
        self.campaign_id = Some(campaign_id.into());
        self
    }

    fn platform(&self) -> Option<&str> {
        self.platform.as_deref().filter(|p| !p.is_empty())
    }

    fn campaign_id(&self) -> Option<&str> {
        self.campaign_id.as_deref().filter(|c| !c.is_empty())
    }

    fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        qb.push(" WHERE 1 = 1");
        if let Some(platform) = self.platform() {
            qb.push(" AND platform = ").push_bind(platform.to_string());
        }
        if let Some(campaign_id) = self.campaign_id() {
            qb.push(" AND campaign_id = ").push_bind(campaign_id.to_string());
        }
        if let Some(start) = self.start_date {
            qb.push(" AND event_date >= ")
                .push_bind(start.format(EVENT_DATE_FORMAT).to_string());
        }
        if let Some(end) = self.end_date {
            qb.push(" AND event_date <= ")
                .push_bind(end.format(EVENT_DATE_FORMAT).to_string());
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MetricSums {
    total_spend: f64,
    total_clicks: i64,
    total_impressions: i64,
    total_conversions: i64,
    total_revenue: f64,
}

impl MetricSums {
    fn ratios(&self) -> DerivedRatios {
        DerivedRatios::compute(
            self.total_impressions,
            self.total_clicks,
            self.total_spend,
            self.total_conversions,
            self.total_revenue,
        )
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlatformRow {
    platform: String,
    #[sqlx(flatten)]
    sums: MetricSums,
}

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    campaign_id: String,
    campaign_name: String,
    platform: String,
    #[sqlx(flatten)]
    sums: MetricSums,
}

#[derive(Debug, sqlx::FromRow)]
struct DailyRow {
    event_date: String,
    platform: Option<String>,
    #[sqlx(flatten)]
    sums: MetricSums,
}

fn campaign_summary(row: CampaignRow) -> CampaignSummary {
    let ratios = row.sums.ratios();
    CampaignSummary {
        campaign_id: row.campaign_id,
        campaign_name: row.campaign_name,
        platform: row.platform,
        total_spend: row.sums.total_spend,
        total_clicks: row.sums.total_clicks,
        total_impressions: row.sums.total_impressions,
        total_conversions: row.sums.total_conversions,
        total_revenue: row.sums.total_revenue,
        ratios,
    }
}

/// Spend/revenue/etc. per platform, ordered by platform
pub async fn platform_summaries(
    pool: &SqlitePool,
    filter: &MetricsFilter,
) -> Result<Vec<PlatformSummary>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT platform, {} FROM ad_performance",
        METRIC_SUMS
    ));
    filter.push_where(&mut qb);
    qb.push(" GROUP BY platform ORDER BY platform");

    let rows: Vec<PlatformRow> = qb.build_query_as().fetch_all(pool).await?;
    debug!(rows = rows.len(), "platform_summaries");

    Ok(rows
        .into_iter()
        .map(|row| {
            let ratios = row.sums.ratios();
            PlatformSummary {
                platform: row.platform,
                total_spend: row.sums.total_spend,
                total_clicks: row.sums.total_clicks,
                total_impressions: row.sums.total_impressions,
                total_conversions: row.sums.total_conversions,
                total_revenue: row.sums.total_revenue,
                ratios,
            }
        })
        .collect())
}

/// Per-campaign sums, ordered by platform then campaign name
pub async fn campaign_summaries(
    pool: &SqlitePool,
    filter: &MetricsFilter,
) -> Result<Vec<CampaignSummary>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT campaign_id, campaign_name, platform, {} FROM ad_performance",
        METRIC_SUMS
    ));
    filter.push_where(&mut qb);
    qb.push(
        " GROUP BY campaign_id, campaign_name, platform \
         ORDER BY platform, campaign_name",
    );

    let rows: Vec<CampaignRow> = qb.build_query_as().fetch_all(pool).await?;
    debug!(rows = rows.len(), "campaign_summaries");

    Ok(rows.into_iter().map(campaign_summary).collect())
}

/// Daily sums ordered by date
///
/// Without a platform filter each day is further split per platform; with
/// one, every point carries the filtered platform.
pub async fn daily_timeseries(
    pool: &SqlitePool,
    filter: &MetricsFilter,
) -> Result<Vec<DailyTimeseriesPoint>> {
    let split_by_platform = filter.platform().is_none();
    let rows = fetch_daily(pool, filter, split_by_platform).await?;

    rows.into_iter()
        .map(|row| {
            let platform = filter.platform().map(str::to_string).or(row.platform.clone());
            daily_point(row, platform, filter.campaign_id().map(str::to_string))
        })
        .collect()
}

/// Totals plus day-by-day series for one campaign; `None` if it has no rows
/// in the requested window
pub async fn campaign_detail(
    pool: &SqlitePool,
    campaign_id: &str,
    filter: &MetricsFilter,
) -> Result<Option<CampaignDetail>> {
    let scoped = MetricsFilter {
        platform: None,
        campaign_id: Some(campaign_id.to_string()),
        start_date: filter.start_date,
        end_date: filter.end_date,
    };

    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT campaign_id, campaign_name, platform, {} FROM ad_performance",
        METRIC_SUMS
    ));
    scoped.push_where(&mut qb);
    qb.push(" GROUP BY campaign_id ORDER BY MIN(id) LIMIT 1");

    let Some(row) = qb
        .build_query_as::<CampaignRow>()
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };

    let summary = campaign_summary(row);
    let timeseries = fetch_daily(pool, &scoped, false)
        .await?
        .into_iter()
        .map(|day| {
            daily_point(
                day,
                Some(summary.platform.clone()),
                Some(campaign_id.to_string()),
            )
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(CampaignDetail {
        summary,
        timeseries,
    }))
}

async fn fetch_daily(
    pool: &SqlitePool,
    filter: &MetricsFilter,
    split_by_platform: bool,
) -> Result<Vec<DailyRow>> {
    let platform_column = if split_by_platform { "platform" } else { "NULL AS platform" };
    let mut qb = QueryBuilder::<Sqlite>::new(format!(
        "SELECT event_date, {}, {} FROM ad_performance",
        platform_column, METRIC_SUMS
    ));
    filter.push_where(&mut qb);
    if split_by_platform {
        qb.push(" GROUP BY event_date, platform ORDER BY event_date, platform");
    } else {
        qb.push(" GROUP BY event_date ORDER BY event_date");
    }

    let rows: Vec<DailyRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows)
}

fn daily_point(
    row: DailyRow,
    platform: Option<String>,
    campaign_id: Option<String>,
) -> Result<DailyTimeseriesPoint> {
    let date = NaiveDate::parse_from_str(&row.event_date, EVENT_DATE_FORMAT).map_err(|_| {
        Error::Integrity(format!("event_date '{}' is not YYYY-MM-DD", row.event_date))
    })?;

    Ok(DailyTimeseriesPoint {
        date,
        platform,
        campaign_id,
        spend: row.sums.total_spend,
        clicks: row.sums.total_clicks,
        impressions: row.sums.total_impressions,
        conversions: row.sums.total_conversions,
        revenue: row.sums.total_revenue,
        roas: calc_rate(row.sums.total_revenue, row.sums.total_spend),
    })
}
