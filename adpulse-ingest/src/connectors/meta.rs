use super::{campaign_name, resolve_revenue, Connector, Platform, RawRow};
use crate::error::{DateError, Result};
use crate::identifiers::build_campaign_id;
use crate::parsers::{parse_date, parse_float, parse_int};
use adpulse_common::NormalizedRecord;

const REVENUE_KEYS: [&str; 5] = [
    "purchase_roas",
    "purchase_value",
    "purchase_conversion_value",
    "revenue",
    "value",
];

/// Meta (Facebook/Instagram) Ads Manager export
#[derive(Debug, Clone)]
pub struct MetaAdsConnector {
    platform: Platform,
}

impl MetaAdsConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            platform: Platform::new("meta", "Meta Ads")?,
        })
    }
}

impl Connector for MetaAdsConnector {
    fn platform(&self) -> &Platform {
        &self.platform
    }

    fn normalize_row(&self, row: &RawRow) -> std::result::Result<NormalizedRecord, DateError> {
        let campaign_name = campaign_name(row.get("campaign_name"));
        let conversions = parse_int(row.first_present(&["purchases", "conversions"]), 0);

        Ok(NormalizedRecord {
            platform: self.platform.name().to_string(),
            campaign_id: build_campaign_id(self.platform.slug(), &campaign_name, row.get("campaign_id")),
            event_date: parse_date(row.first_present(&["reporting_starts", "date"]))?,
            impressions: parse_int(row.get("impressions"), 0),
            clicks: parse_int(row.first_present(&["link_clicks", "clicks"]), 0),
            // Meta exports plain decimals; no currency stripping
            spend: parse_float(row.get("spend"), 0.0),
            conversions,
            revenue: resolve_revenue(row, &REVENUE_KEYS, conversions),
            campaign_name,
        })
    }
}
