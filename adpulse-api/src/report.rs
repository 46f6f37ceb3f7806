//! Performance report builder and paginated text renderer

use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::format::{count, money};
use crate::insights::{account_health_summary, roas_drop_explanation};
use crate::llm::TextGeneration;
use adpulse_common::db::aggregates::{campaign_summaries, platform_summaries};
use adpulse_common::db::{CampaignSummary, MetricsFilter, PlatformSummary};
use adpulse_common::{Result, StorageManager};

pub const REPORT_EXTENSION: &str = "txt";
pub const TOP_CAMPAIGN_LIMIT: usize = 10;
pub const ACCOUNT_INSIGHT_PLACEHOLDER: &str = "AI account insights unavailable.";

pub const LINES_PER_PAGE: usize = 54;
const LINE_WIDTH: usize = 90;
const PAGE_BREAK: char = '\u{0c}';

/// Everything that goes into one report document
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub date_range: String,
    pub platform_summaries: Vec<PlatformSummary>,
    pub top_campaigns: Vec<CampaignSummary>,
    pub ai_account_health: String,
    pub ai_roas_insights: Option<String>,
}

/// A rendered report file on disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportFile {
    pub name: String,
    pub path: PathBuf,
    pub size_kb: f64,
}

pub fn report_file_name(start_date: NaiveDate, end_date: NaiveDate) -> String {
    format!(
        "adpulse_report_{}_{}.{}",
        start_date, end_date, REPORT_EXTENSION
    )
}

/// Highest-spend campaigns first
pub fn top_campaigns(mut campaigns: Vec<CampaignSummary>, limit: usize) -> Vec<CampaignSummary> {
    campaigns.sort_by(|a, b| b.total_spend.total_cmp(&a.total_spend));
    campaigns.truncate(limit);
    campaigns
}

/// Gather data for `[start_date, end_date]` and write the report into `output_dir`
///
/// Insight failures are logged and replaced by placeholder text; only store
/// and filesystem errors abort the build.
pub async fn build_report(
    storage: &StorageManager,
    generator: Option<&dyn TextGeneration>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    output_dir: &Path,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(output_dir).await?;

    let filter = MetricsFilter::date_range(Some(start_date), Some(end_date));
    let platforms = platform_summaries(storage.pool(), &filter).await?;
    let campaigns = campaign_summaries(storage.pool(), &filter).await?;

    let ai_account_health =
        match account_health_summary(storage, generator, start_date, end_date).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => ACCOUNT_INSIGHT_PLACEHOLDER.to_string(),
            Err(e) => {
                warn!("Account health insight unavailable: {}", e);
                ACCOUNT_INSIGHT_PLACEHOLDER.to_string()
            }
        };

    let ai_roas_insights = match platforms.first() {
        Some(primary) => {
            match roas_drop_explanation(storage, generator, &primary.platform, start_date, end_date)
                .await
            {
                Ok(text) => Some(text),
                Err(e) => {
                    warn!(platform = %primary.platform, "ROAS insight unavailable: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let data = ReportData {
        title: "AdPulse Weekly Performance Overview".to_string(),
        date_range: format!("{} to {}", start_date, end_date),
        platform_summaries: platforms,
        top_campaigns: top_campaigns(campaigns, TOP_CAMPAIGN_LIMIT),
        ai_account_health,
        ai_roas_insights,
    };

    let path = output_dir.join(report_file_name(start_date, end_date));
    tokio::fs::write(&path, render_document(&data)).await?;

    info!("Report written to {}", path.display());
    Ok(path)
}

/// Single-day report
pub async fn build_daily_report(
    storage: &StorageManager,
    generator: Option<&dyn TextGeneration>,
    day: NaiveDate,
    output_dir: &Path,
) -> Result<PathBuf> {
    build_report(storage, generator, day, day, output_dir).await
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.len() + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }
    lines
}

fn heading(lines: &mut Vec<String>, text: &str, underline: char) {
    lines.push(text.to_string());
    lines.push(underline.to_string().repeat(text.chars().count()));
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

/// Body lines of the document, before pagination
pub fn render_lines(data: &ReportData) -> Vec<String> {
    let mut lines = Vec::new();

    heading(&mut lines, "AdPulse Performance Report", '=');
    lines.push(String::new());
    lines.push(data.title.clone());
    lines.push(data.date_range.clone());
    lines.push(String::new());

    heading(&mut lines, "Overall Summary", '-');
    if data.platform_summaries.is_empty() {
        lines.push("No platform data available for this period.".to_string());
    }
    for p in &data.platform_summaries {
        lines.push(format!(
            "{}: Spend {} | Revenue {} | Conversions {} | ROAS {:.2}x",
            p.platform,
            money(p.total_spend),
            money(p.total_revenue),
            count(p.total_conversions),
            p.ratios.roas
        ));
    }
    lines.push(String::new());

    for p in &data.platform_summaries {
        heading(&mut lines, &p.platform, '-');
        lines.push(format!("Spend: {}", money(p.total_spend)));
        lines.push(format!("Revenue: {}", money(p.total_revenue)));
        lines.push(format!("Impressions: {}", count(p.total_impressions)));
        lines.push(format!("Clicks: {}", count(p.total_clicks)));
        lines.push(format!("Conversions: {}", count(p.total_conversions)));
        lines.push(format!(
            "ROAS: {:.2}x, CPC: {}, CPA: {}",
            p.ratios.roas,
            money(p.ratios.cpc),
            money(p.ratios.cpa)
        ));
        lines.push(String::new());
    }

    heading(&mut lines, "Top Campaigns", '-');
    if data.top_campaigns.is_empty() {
        lines.push("No campaign data available.".to_string());
    } else {
        lines.push(format!(
            "{:<32} {:<12} {:>14} {:>14} {:>8}",
            "Campaign", "Platform", "Spend", "Revenue", "ROAS"
        ));
        lines.push("-".repeat(LINE_WIDTH - 6));
        for c in &data.top_campaigns {
            lines.push(format!(
                "{:<32} {:<12} {:>14} {:>14} {:>8}",
                truncate(&c.campaign_name, 32),
                truncate(&c.platform, 12),
                money(c.total_spend),
                money(c.total_revenue),
                format!("{:.2}x", c.ratios.roas)
            ));
        }
    }
    lines.push(String::new());

    heading(&mut lines, "AI Account Health Summary", '-');
    lines.extend(wrap(&data.ai_account_health, LINE_WIDTH));
    lines.push(String::new());

    if let Some(roas) = data.ai_roas_insights.as_deref().filter(|t| !t.is_empty()) {
        heading(&mut lines, "AI ROAS Insights", '-');
        lines.extend(wrap(roas, LINE_WIDTH));
    }

    lines
}

/// Split body lines into pages with a "Page i of n" footer on each
pub fn paginate(lines: &[String], lines_per_page: usize) -> Vec<String> {
    let per_page = lines_per_page.max(1);
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![lines]
    } else {
        lines.chunks(per_page).collect()
    };
    let total = chunks.len();

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut page = chunk.join("\n");
            page.push_str("\n\n");
            let footer = format!("Page {} of {}", i + 1, total);
            page.push_str(&format!("{:>width$}", footer, width = LINE_WIDTH));
            page.push('\n');
            page
        })
        .collect()
}

pub fn render_document(data: &ReportData) -> String {
    let separator = PAGE_BREAK.to_string();
    paginate(&render_lines(data), LINES_PER_PAGE).join(&separator)
}

/// Report files in `directory`, sorted by name; a missing directory is empty
pub fn list_reports(directory: &Path) -> Result<Vec<ReportFile>> {
    if !directory.exists() {
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        let is_report = path
            .extension()
            .map(|ext| ext == REPORT_EXTENSION)
            .unwrap_or(false);
        if !is_report || !path.is_file() {
            continue;
        }

        let size = entry.metadata()?.len() as f64;
        reports.push(ReportFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path,
            size_kb: (size / 1024.0 * 10.0).round() / 10.0,
        });
    }

    reports.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(reports)
}

/// Placeholder delivery: records the intent, sends nothing
pub fn send_report_via_email(to_email: &str, report_path: &Path) {
    info!(
        "[Email Stub] Would send report '{}' to '{}'.",
        report_path.display(),
        to_email
    );
}
