//! HTTP handlers

pub mod campaigns;
pub mod health;
pub mod insights;
pub mod reports;
pub mod summary;
pub mod timeseries;

pub use campaigns::{campaign_detail, campaign_summary};
pub use health::health_routes;
pub use insights::{account_health, roas_drop};
pub use reports::{generate_report, list_reports};
pub use summary::platform_summary;
pub use timeseries::daily_timeseries;

use chrono::NaiveDate;
use serde::Deserialize;

/// `?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD`, both optional
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
