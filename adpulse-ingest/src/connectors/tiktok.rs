use super::{campaign_name, resolve_revenue, Connector, Platform, RawRow};
use crate::error::{DateError, Result};
use crate::identifiers::build_campaign_id;
use crate::parsers::{parse_date, parse_float, parse_int};
use adpulse_common::NormalizedRecord;

const REVENUE_KEYS: [&str; 4] = ["Revenue", "ConversionValue", "PurchaseValue", "Value"];

#[derive(Debug, Clone)]
pub struct TikTokAdsConnector {
    platform: Platform,
}

impl TikTokAdsConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            platform: Platform::new("tiktok", "TikTok Ads")?,
        })
    }
}

impl Connector for TikTokAdsConnector {
    fn platform(&self) -> &Platform {
        &self.platform
    }

    fn normalize_row(&self, row: &RawRow) -> std::result::Result<NormalizedRecord, DateError> {
        let campaign_name = campaign_name(row.first_present(&["CampaignName", "campaign_name"]));
        let conversions = parse_int(row.first_present(&["Conversions", "Leads"]), 0);

        Ok(NormalizedRecord {
            platform: self.platform.name().to_string(),
            campaign_id: build_campaign_id(self.platform.slug(), &campaign_name, row.get("CampaignId")),
            event_date: parse_date(row.first_present(&["StatDate", "date"]))?,
            impressions: parse_int(row.get("Impressions"), 0),
            clicks: parse_int(row.get("Clicks"), 0),
            spend: parse_float(row.first_present(&["Cost", "Spend"]), 0.0),
            conversions,
            revenue: resolve_revenue(row, &REVENUE_KEYS, conversions),
            campaign_name,
        })
    }
}
