//! Connector normalization against CSV files on disk

use adpulse_ingest::connectors::{
    Connector, GoogleAdsConnector, MetaAdsConnector, TikTokAdsConnector, DEFAULT_CONVERSION_VALUE,
};
use adpulse_ingest::error::DateError;
use adpulse_ingest::IngestError;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_google_single_row() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "google.csv",
        "Campaign,Date,Impressions,Clicks,Cost,Conversions\nBrand,2024-01-01,1000,25,12.3,5\n",
    );

    let records = GoogleAdsConnector::new().unwrap().load_file(&path).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.platform, "Google Ads");
    assert!(record.campaign_id.starts_with("google-"));
    assert_eq!(record.campaign_name, "Brand");
    assert_eq!(record.event_date, ymd(2024, 1, 1));
    assert_eq!(record.impressions, 1000);
    assert_eq!(record.clicks, 25);
    assert!((record.spend - 12.3).abs() < 1e-9);
    assert_eq!(record.conversions, 5);
    assert_eq!(record.revenue, 125.0);
}

#[test]
fn test_google_fixture_with_bom_money_and_blank_row() {
    let records = GoogleAdsConnector::new()
        .unwrap()
        .load_file(&fixture("google_ads.csv"))
        .unwrap();

    assert_eq!(records.len(), 3);

    assert_eq!(records[0].campaign_id, "google-brand-search");
    assert_eq!(records[0].spend, 1200.5);
    assert_eq!(records[0].revenue, 250.0);

    assert_eq!(records[1].spend, 950.0);
    assert_eq!(records[1].revenue, 410.25);

    assert_eq!(records[2].campaign_id, "987654");
    assert_eq!(records[2].campaign_name, "Shopping - US");
    assert_eq!(records[2].event_date, ymd(2024, 5, 3));
}

#[test]
fn test_meta_single_row_month_first_date() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "meta.csv",
        "campaign_name,reporting_starts,impressions,link_clicks,spend,purchases\nProspecting,01/02/2024,500,10,5.00,2\n",
    );

    let records = MetaAdsConnector::new().unwrap().load_file(&path).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.platform, "Meta Ads");
    assert_eq!(record.campaign_id, "meta-prospecting");
    assert_eq!(record.event_date, ymd(2024, 1, 2));
    assert_eq!(record.impressions, 500);
    assert_eq!(record.clicks, 10);
    assert_eq!(record.conversions, 2);
    assert_eq!(record.revenue, 2.0 * DEFAULT_CONVERSION_VALUE);
}

#[test]
fn test_meta_fixture_alias_fallbacks() {
    let records = MetaAdsConnector::new()
        .unwrap()
        .load_file(&fixture("meta_ads.csv"))
        .unwrap();
    assert_eq!(records.len(), 3);

    // link_clicks empty → clicks; no purchases and no conversions column
    assert_eq!(records[1].clicks, 12);
    assert_eq!(records[1].conversions, 0);
    assert_eq!(records[1].revenue, 0.0);
    assert_eq!(records[1].spend, 7.5);

    assert_eq!(records[2].campaign_id, "23851");
    assert_eq!(records[2].event_date, ymd(2024, 5, 1));
    assert_eq!(records[2].revenue, 180.0);
}

#[test]
fn test_tiktok_single_row() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "tiktok.csv",
        "CampaignName,StatDate,Impressions,Clicks,Cost,Conversions\nLaunch,2024/03/01,250,9,3.5,1\n",
    );

    let records = TikTokAdsConnector::new().unwrap().load_file(&path).unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.platform, "TikTok Ads");
    assert_eq!(record.campaign_id, "tiktok-launch");
    assert_eq!(record.event_date, ymd(2024, 3, 1));
    assert_eq!(record.impressions, 250);
    assert_eq!(record.clicks, 9);
    assert_eq!(record.spend, 3.5);
    assert_eq!(record.revenue, 25.0);
}

#[test]
fn test_tiktok_fixture_alias_fallbacks() {
    let records = TikTokAdsConnector::new()
        .unwrap()
        .load_file(&fixture("tiktok_ads.csv"))
        .unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[1].spend, 4.75);
    assert_eq!(records[1].conversions, 2);
    assert_eq!(records[1].revenue, 50.0);

    assert_eq!(records[2].campaign_id, "TT-77");
    assert_eq!(records[2].event_date, ymd(2024, 3, 1));
    assert_eq!(records[2].revenue, 96.5);
}

#[test]
fn test_revenue_fallback_is_uniform_across_connectors() {
    let dir = TempDir::new().unwrap();
    let cases: Vec<(Box<dyn Connector>, &str)> = vec![
        (
            Box::new(GoogleAdsConnector::new().unwrap()),
            "Campaign,Date,Conversions\nA,2024-01-01,4\n",
        ),
        (
            Box::new(MetaAdsConnector::new().unwrap()),
            "campaign_name,date,conversions\nA,2024-01-01,4\n",
        ),
        (
            Box::new(TikTokAdsConnector::new().unwrap()),
            "campaign_name,date,Leads\nA,2024-01-01,4\n",
        ),
    ];

    for (connector, content) in cases {
        let path = write_csv(&dir, &format!("{}.csv", connector.platform().slug()), content);
        let records = connector.load_file(&path).unwrap();
        assert_eq!(records[0].revenue, 100.0, "{}", connector.platform().slug());
    }
}

#[test]
fn test_missing_campaign_name_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "google.csv", "Campaign,Date\n   ,2024-01-01\n");

    let records = GoogleAdsConnector::new().unwrap().load_file(&path).unwrap();
    assert_eq!(records[0].campaign_name, "Unknown Campaign");
    assert_eq!(records[0].campaign_id, "google-unknown-campaign");
}

#[test]
fn test_malformed_numbers_default_to_zero() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "google.csv",
        "Campaign,Date,Impressions,Clicks,Cost,Conversions\nA,2024-01-01,lots,n/a,free,??\n",
    );

    let records = GoogleAdsConnector::new().unwrap().load_file(&path).unwrap();
    let record = &records[0];
    assert_eq!(record.impressions, 0);
    assert_eq!(record.clicks, 0);
    assert_eq!(record.spend, 0.0);
    assert_eq!(record.conversions, 0);
    assert_eq!(record.revenue, 0.0);
}

#[test]
fn test_missing_date_aborts_with_row_number() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        &dir,
        "google.csv",
        "Campaign,Date,Clicks\nA,2024-01-01,1\nB,,2\nC,2024-01-03,3\n",
    );

    let err = GoogleAdsConnector::new().unwrap().load_file(&path).unwrap_err();
    match err {
        IngestError::Date { row, source } => {
            assert_eq!(row, 2);
            assert_eq!(source, DateError::Missing);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unparseable_date_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "meta.csv", "campaign_name,date\nA,last tuesday\n");

    let err = MetaAdsConnector::new().unwrap().load_file(&path).unwrap_err();
    assert!(err.to_string().contains("last tuesday"));
    assert!(err.to_string().starts_with("Row 1"));
}

#[test]
fn test_missing_file_is_not_found() {
    let err = GoogleAdsConnector::new()
        .unwrap()
        .load_file(Path::new("/nonexistent/adpulse/google.csv"))
        .unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound(_)));
}

#[test]
fn test_header_only_file_yields_no_records() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(&dir, "tiktok.csv", "CampaignName,StatDate\n");

    let records = TikTokAdsConnector::new().unwrap().load_file(&path).unwrap();
    assert!(records.is_empty());
}
