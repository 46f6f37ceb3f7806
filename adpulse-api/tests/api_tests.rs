//! Integration tests for the adpulse-api router
//!
//! Each test builds the router over a fresh SQLite file and drives it with
//! `oneshot` requests. Text generation is replaced by in-process stubs.

use adpulse_api::llm::{GenerationError, TextGeneration};
use adpulse_api::{build_router, AppState};
use adpulse_common::{NormalizedRecord, StorageManager};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

struct RecordingGenerator {
    reply: &'static str,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    fn new(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl TextGeneration for RecordingGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGeneration for FailingGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            body: "model overloaded".to_string(),
        })
    }
}

fn record(
    platform: &str,
    campaign_id: &str,
    day: u32,
    impressions: i64,
    clicks: i64,
    spend: f64,
    conversions: i64,
    revenue: f64,
) -> NormalizedRecord {
    NormalizedRecord {
        platform: platform.to_string(),
        campaign_id: campaign_id.to_string(),
        campaign_name: "Brand".to_string(),
        event_date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        impressions,
        clicks,
        spend,
        conversions,
        revenue,
    }
}

/// Two platforms on 2024-05-01, plus a second Google day
fn fixture_records() -> Vec<NormalizedRecord> {
    vec![
        record("Google Ads", "google-brand", 1, 1000, 100, 200.0, 10, 500.0),
        record("Meta Ads", "meta-brand", 1, 500, 50, 150.0, 5, 250.0),
    ]
}

async fn setup_storage(dir: &TempDir, records: &[NormalizedRecord]) -> StorageManager {
    let storage = StorageManager::open(&dir.path().join("api_test.db"))
        .await
        .expect("open store");
    storage.initialize().await.expect("initialize schema");
    storage.insert_records(records).await.expect("insert fixtures");
    storage
}

fn setup_app(
    dir: &TempDir,
    storage: StorageManager,
    generator: Option<Arc<dyn TextGeneration>>,
) -> Router {
    build_router(AppState::new(storage, generator, dir.path().join("reports")))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).expect("JSON body");
    (status, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_reports_database_ok() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db_connection"], "ok");
    assert_eq!(body["module"], "adpulse-api");
}

#[tokio::test]
async fn test_health_degrades_when_store_closed() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    storage.close().await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db_connection"], "error");
}

#[tokio::test]
async fn test_root_message() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let (status, body) = send(setup_app(&dir, storage, None), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "AdPulse Metrics API is running");
}

// =============================================================================
// Aggregates
// =============================================================================

#[tokio::test]
async fn test_platform_summary_ratios() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/summary/platforms")).await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    let google = items
        .iter()
        .find(|item| item["platform"] == "Google Ads")
        .unwrap();
    assert_eq!(google["total_spend"], 200.0);
    assert_eq!(google["total_clicks"], 100);
    assert_eq!(google["ctr"], 0.1);
    assert_eq!(google["roas"], 2.5);
    assert_eq!(google["cpc"], 2.0);
    assert_eq!(google["cpa"], 20.0);
}

#[tokio::test]
async fn test_empty_store_returns_empty_arrays() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    for uri in ["/summary/platforms", "/campaigns/summary", "/timeseries/daily"] {
        let (status, body) = send(app.clone(), get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(body, json!([]), "{}", uri);
    }
}

#[tokio::test]
async fn test_date_filter_outside_data_is_empty() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(
        app,
        get("/summary/platforms?start_date=2024-06-01&end_date=2024-06-30"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_malformed_date_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/summary/platforms?start_date=05/01/2024")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_campaign_summary_platform_filter() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/campaigns/summary?platform=Meta%20Ads")).await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["campaign_id"], "meta-brand");
    assert_eq!(items[0]["total_revenue"], 250.0);
}

#[tokio::test]
async fn test_campaign_detail_found() {
    let dir = TempDir::new().unwrap();
    let mut records = fixture_records();
    records.push(record("Google Ads", "google-brand", 2, 1000, 50, 100.0, 2, 50.0));
    let storage = setup_storage(&dir, &records).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/campaigns/google-brand/detail")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["campaign_id"], "google-brand");
    assert_eq!(body["platform"], "Google Ads");
    assert_eq!(body["total_spend"], 300.0);
    assert_eq!(body["timeseries"].as_array().unwrap().len(), 2);
    assert_eq!(body["timeseries"][0]["date"], "2024-05-01");
    assert_eq!(body["timeseries"][1]["roas"], 0.5);
}

#[tokio::test]
async fn test_unknown_campaign_is_not_found() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/campaigns/does-not-exist/detail")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["message"], "Campaign not found");
}

#[tokio::test]
async fn test_daily_timeseries_groups_by_platform() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (_, all) = send(app.clone(), get("/timeseries/daily")).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, google) = send(app, get("/timeseries/daily?platform=Google%20Ads")).await;
    let points = google.as_array().unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0]["platform"], "Google Ads");
    assert_eq!(points[0]["roas"], 2.5);
}

// =============================================================================
// Insights
// =============================================================================

#[tokio::test]
async fn test_roas_drop_uses_generator() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let generator = RecordingGenerator::new("ROAS fell because of creative fatigue.");
    let app = setup_app(&dir, storage, Some(generator.clone() as Arc<dyn TextGeneration>));

    let (status, body) = send(
        app,
        get("/insights/roas-drop?platform=Google%20Ads&start_date=2024-05-01&end_date=2024-05-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], true);
    assert_eq!(body["platform"], "Google Ads");
    assert_eq!(body["analysis"], "ROAS fell because of creative fatigue.");

    let prompts = generator.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("2024-05-01 | $200.00 | $500.00 | 2.50x"));
}

#[tokio::test]
async fn test_roas_drop_without_data_skips_generation() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let generator = RecordingGenerator::new("unused");
    let app = setup_app(&dir, storage, Some(generator.clone() as Arc<dyn TextGeneration>));

    let (status, body) = send(
        app,
        get("/insights/roas-drop?platform=Google%20Ads&start_date=2024-05-01&end_date=2024-05-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["analysis"],
        "No time series data was available for this platform in the selected window."
    );
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_insights_degrade_without_generator() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(
        app,
        get("/insights/account-health?start_date=2024-05-01&end_date=2024-05-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["analysis"], "AI insights unavailable.");
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn test_insights_degrade_on_generation_failure() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let app = setup_app(&dir, storage, Some(Arc::new(FailingGenerator) as Arc<dyn TextGeneration>));

    let (status, body) = send(
        app,
        get("/insights/account-health?start_date=2024-05-01&end_date=2024-05-07"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert!(body["error"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_insights_require_dates() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    let (status, _) = send(app, get("/insights/roas-drop?platform=Google%20Ads")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Reports
// =============================================================================

#[tokio::test]
async fn test_generate_and_list_report() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let generator = RecordingGenerator::new("Healthy account.");
    let app = setup_app(&dir, storage, Some(generator as Arc<dyn TextGeneration>));

    let (status, body) = send(
        app.clone(),
        post_json(
            "/reports/generate",
            json!({"start_date": "2024-05-01", "end_date": "2024-05-07"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Report generated successfully");

    let report_path = body["report_path"].as_str().unwrap().to_string();
    assert!(report_path.ends_with("adpulse_report_2024-05-01_2024-05-07.txt"));
    let document = std::fs::read_to_string(&report_path).unwrap();
    assert!(document.contains("Google Ads: Spend $200.00"));
    assert!(document.contains("Healthy account."));

    let (status, body) = send(app, get("/reports/list")).await;
    assert_eq!(status, StatusCode::OK);
    let reports = body["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["name"], "adpulse_report_2024-05-01_2024-05-07.txt");
}

#[tokio::test]
async fn test_send_email_requires_address() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(
        app,
        post_json(
            "/reports/generate",
            json!({"start_date": "2024-05-01", "end_date": "2024-05-07", "send_email": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Email address required when send_email is true"
    );
    assert!(!dir.path().join("reports").exists());
}

#[tokio::test]
async fn test_list_reports_missing_directory() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &[]).await;
    let app = setup_app(&dir, storage, None);

    let (status, body) = send(app, get("/reports/list?directory=/nonexistent/adpulse")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"reports": []}));
}

#[tokio::test]
async fn test_daily_report_without_generator() {
    let dir = TempDir::new().unwrap();
    let storage = setup_storage(&dir, &fixture_records()).await;
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let path = adpulse_api::report::build_daily_report(&storage, None, day, dir.path())
        .await
        .unwrap();
    assert!(path.ends_with("adpulse_report_2024-05-01_2024-05-01.txt"));

    let document = std::fs::read_to_string(&path).unwrap();
    assert!(document.contains("Meta Ads: Spend $150.00"));
    assert!(document.contains(adpulse_api::report::ACCOUNT_INSIGHT_PLACEHOLDER));
    assert!(!document.contains("AI ROAS Insights"));
}
