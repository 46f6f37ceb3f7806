//! Subcommand implementations

use adpulse_api::format::{count, money};
use adpulse_api::llm::{LlmSettings, TextGeneration, TextGenerator};
use adpulse_api::report;
use adpulse_common::config::Settings;
use adpulse_common::db::{PlatformTotals, Totals};
use adpulse_common::StorageManager;
use adpulse_ingest::{ConnectorRegistry, DataIngestor};
use anyhow::{bail, Context, Result};
use chrono::{Duration, Local, NaiveDate};
use std::path::Path;
use tracing::{info, warn};

const TABLE_HEADER: [&str; 7] = [
    "Platform",
    "Rows",
    "Impressions",
    "Clicks",
    "Spend",
    "Conversions",
    "Revenue",
];

async fn open_ingestor(settings: &Settings) -> Result<DataIngestor> {
    let storage = StorageManager::open(&settings.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", settings.db_path.display()))?;
    let registry = ConnectorRegistry::with_defaults().context("Failed to build connector registry")?;
    DataIngestor::new(registry, storage)
        .await
        .context("Failed to initialize schema")
}

pub async fn load(settings: &Settings, platform: &str, csv_path: &Path) -> Result<()> {
    let ingestor = open_ingestor(settings).await?;
    let outcome = ingestor.ingest_file(platform, csv_path).await?;
    println!(
        "Loaded {} rows for {} from {}",
        outcome.rows_ingested,
        outcome.platform_name,
        outcome.source_path.display()
    );
    ingestor.storage().close().await;
    Ok(())
}

pub async fn summary(settings: &Settings) -> Result<()> {
    let ingestor = open_ingestor(settings).await?;
    let rows = ingestor.summary_rows().await?;
    if rows.is_empty() {
        println!("No data found. Load CSV files first with `adpulse load ...`.");
    } else {
        for line in summary_table(&rows) {
            println!("{}", line);
        }
        let totals = ingestor.storage().fetch_totals().await?;
        println!("\n{}", grand_total_line(&totals));
    }
    ingestor.storage().close().await;
    Ok(())
}

pub async fn verify(settings: &Settings) -> Result<()> {
    let ingestor = open_ingestor(settings).await?;
    println!("ad_performance rows: {}", ingestor.table_row_count().await?);
    ingestor.storage().close().await;
    Ok(())
}

/// Fill in a missing end (today) or start (end minus six days)
pub fn report_window(
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let end = end_date.unwrap_or_else(|| Local::now().date_naive());
    let start = start_date.unwrap_or(end - Duration::days(6));
    if start > end {
        bail!("start date {} is after end date {}", start, end);
    }
    Ok((start, end))
}

pub async fn generate_report(
    settings: &Settings,
    start_date: NaiveDate,
    end_date: NaiveDate,
    email: Option<&str>,
) -> Result<()> {
    let ingestor = open_ingestor(settings).await?;

    let generator = match TextGenerator::new(LlmSettings::from_env()) {
        Ok(generator) => Some(generator),
        Err(e) => {
            warn!("AI insights disabled: {}", e);
            None
        }
    };

    info!("Building report for {} to {}", start_date, end_date);
    let path = report::build_report(
        ingestor.storage(),
        generator.as_ref().map(|g| g as &dyn TextGeneration),
        start_date,
        end_date,
        &settings.reports_dir,
    )
    .await
    .context("Failed to build report")?;

    if let Some(to) = email.map(str::trim).filter(|e| !e.is_empty()) {
        report::send_report_via_email(to, &path);
    }

    println!("Report written to {}", path.display());
    ingestor.storage().close().await;
    Ok(())
}

pub fn list_reports(directory: &Path) -> Result<()> {
    let reports = report::list_reports(directory)
        .with_context(|| format!("Failed to read {}", directory.display()))?;
    if reports.is_empty() {
        println!("No reports found in {}", directory.display());
        return Ok(());
    }
    for file in reports {
        println!("{:<48} {:>8.1} KB", file.name, file.size_kb);
    }
    Ok(())
}

fn table_cells(totals: &PlatformTotals) -> [String; 7] {
    [
        totals.platform.clone(),
        count(totals.rows_ingested),
        count(totals.impressions),
        count(totals.clicks),
        money(totals.spend),
        count(totals.conversions),
        money(totals.revenue),
    ]
}

/// Aligned per-platform rows; platform left-aligned, numbers right-aligned
pub fn summary_table(rows: &[PlatformTotals]) -> Vec<String> {
    let header = TABLE_HEADER.map(str::to_string);
    let body: Vec<[String; 7]> = rows.iter().map(table_cells).collect();

    let mut widths = header.clone().map(|cell| cell.len());
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String; 7]| {
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, width))| {
                if i == 0 {
                    format!("{:<width$}", cell, width = width)
                } else {
                    format!("{:>width$}", cell, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    let rule = "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1));
    let mut lines = vec![render(&header), rule];
    lines.extend(body.iter().map(&render));
    lines
}

pub fn grand_total_line(totals: &Totals) -> String {
    format!(
        "Grand Total Rows: {} | Spend: {} | Conversions: {} | Revenue: {}",
        count(totals.rows_ingested),
        money(totals.spend),
        count(totals.conversions),
        money(totals.revenue)
    )
}
