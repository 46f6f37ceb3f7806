//! Database initialization
//!
//! Opens (creating if needed) the SQLite file and ensures the single
//! `ad_performance` table and its two composite indexes exist. Schema creation
//! is idempotent; there is no migration machinery.

use crate::{Error, Result};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

pub const AD_PERFORMANCE_TABLE: &str = "ad_performance";

/// Open a connection pool on `db_path`, creating the file and parent folder
pub async fn open_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .map_err(|source| Error::StorageUnavailable {
            path: db_path.to_path_buf(),
            source,
        })?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    Ok(pool)
}

/// Create the `ad_performance` table and its indexes if absent
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ad_performance (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            campaign_id TEXT NOT NULL,
            campaign_name TEXT NOT NULL,
            event_date TEXT NOT NULL,
            impressions INTEGER NOT NULL,
            clicks INTEGER NOT NULL,
            spend REAL NOT NULL,
            conversions INTEGER NOT NULL,
            revenue REAL NOT NULL DEFAULT 0,
            created_at TEXT DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Per-campaign time series
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ad_perf_campaign_date
         ON ad_performance (campaign_id, event_date)",
    )
    .execute(pool)
    .await?;

    // Per-platform time series
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ad_perf_platform_date
         ON ad_performance (platform, event_date)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
