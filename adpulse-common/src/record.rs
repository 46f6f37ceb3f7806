//! Canonical ad-performance record
//!
//! Every platform connector produces this shape; the storage layer consumes it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for the persisted `event_date` column.
///
/// Range filters compare this column as text, which is only correct while
/// every stored value uses this exact zero-padded format.
pub const EVENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// One day of performance for one campaign on one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Platform display name ("Google Ads", "Meta Ads", ...)
    pub platform: String,
    /// Native campaign id, or `{platform_slug}-{slug(name)}`
    pub campaign_id: String,
    pub campaign_name: String,
    pub event_date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
}

impl NormalizedRecord {
    /// `event_date` rendered in the persisted text format
    pub fn event_date_key(&self) -> String {
        self.event_date.format(EVENT_DATE_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_date_key_is_zero_padded() {
        let record = NormalizedRecord {
            platform: "Google Ads".to_string(),
            campaign_id: "google-brand".to_string(),
            campaign_name: "Brand".to_string(),
            event_date: NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
            impressions: 0,
            clicks: 0,
            spend: 0.0,
            conversions: 0,
            revenue: 0.0,
        };
        assert_eq!(record.event_date_key(), "2024-03-07");
    }
}
