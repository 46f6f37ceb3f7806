use super::{campaign_name, resolve_revenue, Connector, Platform, RawRow};
use crate::error::{DateError, Result};
use crate::identifiers::build_campaign_id;
use crate::parsers::{parse_date, parse_int, parse_money};
use adpulse_common::NormalizedRecord;

const REVENUE_KEYS: [&str; 4] = ["Revenue", "ConversionValue", "Conversion value", "PurchaseValue"];

/// Google Ads campaign report export
#[derive(Debug, Clone)]
pub struct GoogleAdsConnector {
    platform: Platform,
}

impl GoogleAdsConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            platform: Platform::new("google", "Google Ads")?,
        })
    }
}

impl Connector for GoogleAdsConnector {
    fn platform(&self) -> &Platform {
        &self.platform
    }

    fn normalize_row(&self, row: &RawRow) -> std::result::Result<NormalizedRecord, DateError> {
        let campaign_name = campaign_name(row.get("Campaign"));
        let conversions = parse_int(row.get("Conversions"), 0);

        Ok(NormalizedRecord {
            platform: self.platform.name().to_string(),
            campaign_id: build_campaign_id(self.platform.slug(), &campaign_name, row.get("Campaign ID")),
            event_date: parse_date(row.get("Date"))?,
            impressions: parse_int(row.get("Impressions"), 0),
            clicks: parse_int(row.get("Clicks"), 0),
            spend: parse_money(row.get("Cost"), 0.0),
            conversions,
            revenue: resolve_revenue(row, &REVENUE_KEYS, conversions),
            campaign_name,
        })
    }
}
