//! Natural-language insights over aggregated performance
//!
//! Each insight gathers numbers from the store, builds a prompt and hands
//! it to a [`TextGeneration`] backend. When the window has no data a fixed
//! explanation is returned and no generation call is made.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::anomaly::{find_recent_anomalies, Anomaly, DEFAULT_THRESHOLD_STD};
use crate::format::money;
use crate::llm::{GenerationError, TextGeneration};
use adpulse_common::db::aggregates::{daily_timeseries, platform_summaries};
use adpulse_common::db::{DailyTimeseriesPoint, MetricsFilter, PlatformSummary};
use adpulse_common::StorageManager;

pub const MAX_TOKENS: u32 = 400;

pub const NO_TIMESERIES_MESSAGE: &str =
    "No time series data was available for this platform in the selected window.";
pub const NO_PLATFORM_DATA_MESSAGE: &str = "No platform data found for the requested window.";

#[derive(Debug, Error)]
pub enum InsightError {
    #[error(transparent)]
    Storage(#[from] adpulse_common::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Text generation is not configured; set OPENAI_API_KEY or ADPULSE_LLM_PROVIDER=ollama")]
    NotConfigured,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Earlier and later halves of a series
///
/// The earlier half holds the first `max(1, n / 2)` values. A single-value
/// series is compared against itself.
pub fn split_period(values: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if values.is_empty() {
        return (Vec::new(), Vec::new());
    }
    let half = (values.len() / 2).max(1);
    let previous = values[..half].to_vec();
    let recent = if half < values.len() {
        values[half..].to_vec()
    } else {
        previous.clone()
    };
    (previous, recent)
}

/// Average ROAS before and after the midpoint of a window
#[derive(Debug, Clone, Serialize)]
pub struct RoasTrend {
    pub platform: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub avg_roas_previous: f64,
    pub avg_roas_recent: f64,
    pub percentage_change: f64,
    pub anomalies: Vec<Anomaly>,
}

fn daily_roas(point: &DailyTimeseriesPoint) -> f64 {
    if point.spend == 0.0 {
        0.0
    } else {
        point.revenue / point.spend
    }
}

impl RoasTrend {
    pub fn from_points(
        platform: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        points: &[DailyTimeseriesPoint],
    ) -> Self {
        let dates: Vec<String> = points.iter().map(|p| p.date.to_string()).collect();
        let roas: Vec<f64> = points.iter().map(daily_roas).collect();

        let (previous, recent) = split_period(&roas);
        let avg_previous = mean(&previous);
        let avg_recent = mean(&recent);
        let pct_change = if avg_previous == 0.0 {
            0.0
        } else {
            (avg_recent - avg_previous) / avg_previous * 100.0
        };

        Self {
            platform: platform.to_string(),
            start_date,
            end_date,
            avg_roas_previous: round_to(avg_previous, 4),
            avg_roas_recent: round_to(avg_recent, 4),
            percentage_change: round_to(pct_change, 2),
            anomalies: find_recent_anomalies(&dates, &roas, DEFAULT_THRESHOLD_STD),
        }
    }
}

pub fn roas_drop_prompt(trend: &RoasTrend, points: &[DailyTimeseriesPoint]) -> String {
    let summary_json = serde_json::to_string_pretty(trend).unwrap_or_default();

    let mut table = String::from("Date | Spend | Revenue | ROAS");
    for point in points {
        table.push_str(&format!(
            "\n{} | {} | {} | {:.2}x",
            point.date,
            money(point.spend),
            money(point.revenue),
            daily_roas(point)
        ));
    }

    format!(
        "You are an expert performance marketing analyst.\n\
         Here is ROAS data for platform {platform}.\n\n\
         Summary JSON:\n{summary_json}\n\n\
         Daily data (date | spend | revenue | roas):\n{table}\n\n\
         Explain in plain language why ROAS might have dropped recently.\n\
         Provide 3-5 possible reasons and 3 concrete optimization suggestions.\n\
         Keep it concise and actionable.",
        platform = trend.platform,
    )
}

/// Explain a ROAS decline for one platform over `[start_date, end_date]`
pub async fn roas_drop_explanation(
    storage: &StorageManager,
    generator: Option<&dyn TextGeneration>,
    platform: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<String, InsightError> {
    let filter = MetricsFilter::date_range(Some(start_date), Some(end_date)).with_platform(platform);
    let points = daily_timeseries(storage.pool(), &filter).await?;
    if points.is_empty() {
        return Ok(NO_TIMESERIES_MESSAGE.to_string());
    }

    let generator = generator.ok_or(InsightError::NotConfigured)?;
    let trend = RoasTrend::from_points(platform, start_date, end_date, &points);
    debug!(
        platform,
        days = points.len(),
        change = trend.percentage_change,
        "Built ROAS trend"
    );

    Ok(generator.generate(&roas_drop_prompt(&trend, &points), MAX_TOKENS).await?)
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregateTotals {
    pub spend: f64,
    pub revenue: f64,
    pub conversions: i64,
    pub roas: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountSnapshot {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub platforms: Vec<PlatformSummary>,
    pub aggregate: AggregateTotals,
}

impl AccountSnapshot {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, platforms: Vec<PlatformSummary>) -> Self {
        let spend: f64 = platforms.iter().map(|p| p.total_spend).sum();
        let revenue: f64 = platforms.iter().map(|p| p.total_revenue).sum();
        let conversions: i64 = platforms.iter().map(|p| p.total_conversions).sum();
        let roas = if spend == 0.0 { 0.0 } else { revenue / spend };

        Self {
            start_date,
            end_date,
            platforms,
            aggregate: AggregateTotals {
                spend,
                revenue,
                conversions,
                roas,
            },
        }
    }
}

pub fn account_health_prompt(snapshot: &AccountSnapshot) -> String {
    let data_json = serde_json::to_string_pretty(snapshot).unwrap_or_default();

    format!(
        "You are an elite paid media strategist.\n\
         Assess the following cross-platform performance data between {start} and {end}.\n\n\
         Data JSON:\n{data_json}\n\n\
         Provide:\n\
         1. A concise overall health summary (1 paragraph).\n\
         2. Which platforms to scale up/down and why.\n\
         3. 3 actionable recommendations for budget shifts or campaign testing.\n\
         Keep language concise for an executive audience.",
        start = snapshot.start_date,
        end = snapshot.end_date,
    )
}

/// Cross-platform health assessment over `[start_date, end_date]`
pub async fn account_health_summary(
    storage: &StorageManager,
    generator: Option<&dyn TextGeneration>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<String, InsightError> {
    let filter = MetricsFilter::date_range(Some(start_date), Some(end_date));
    let platforms = platform_summaries(storage.pool(), &filter).await?;
    if platforms.is_empty() {
        return Ok(NO_PLATFORM_DATA_MESSAGE.to_string());
    }

    let generator = generator.ok_or(InsightError::NotConfigured)?;
    let snapshot = AccountSnapshot::new(start_date, end_date, platforms);

    Ok(generator.generate(&account_health_prompt(&snapshot), MAX_TOKENS).await?)
}
