//! adpulse: command-line ingestion and reporting
//!
//! ```bash
//! adpulse load google data/google_ads.csv
//! adpulse summary
//! adpulse generate-report --start-date 2024-05-01 --end-date 2024-05-07
//! ```

mod commands;

use adpulse_common::config::{CliOverrides, Settings};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "adpulse")]
#[command(about = "AdPulse ad performance ingestion and reporting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database file
    #[arg(long, global = true, env = "ADPULSE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Directory for generated reports
    #[arg(long, global = true, env = "ADPULSE_REPORTS_DIR")]
    reports_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest a platform CSV export
    Load {
        /// Platform slug (google, meta, tiktok)
        platform: String,
        /// Path to the CSV file
        csv_path: PathBuf,
    },

    /// Per-platform totals with a grand total
    Summary,

    /// Print the stored row count
    Verify,

    /// Render a performance report for a date range
    GenerateReport {
        /// First day (YYYY-MM-DD); defaults to six days before the end date
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD); defaults to today
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// Deliver the finished report to this address
        #[arg(long)]
        email: Option<String>,
    },

    /// List generated reports
    ListReports {
        /// Directory to scan; defaults to the configured reports directory
        #[arg(long)]
        directory: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(&CliOverrides {
        db_path: cli.db_path,
        reports_dir: cli.reports_dir,
        ..Default::default()
    });

    match cli.command {
        Command::Load { platform, csv_path } => {
            commands::load(&settings, &platform, &csv_path).await
        }
        Command::Summary => commands::summary(&settings).await,
        Command::Verify => commands::verify(&settings).await,
        Command::GenerateReport {
            start_date,
            end_date,
            email,
        } => {
            let (start, end) = commands::report_window(start_date, end_date)?;
            commands::generate_report(&settings, start, end, email.as_deref()).await
        }
        Command::ListReports { directory } => {
            commands::list_reports(directory.as_deref().unwrap_or(&settings.reports_dir))
        }
    }
}
