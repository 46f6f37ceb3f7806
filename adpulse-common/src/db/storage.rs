//! Storage manager: schema, bulk insert and whole-table aggregation
//!
//! The store is append-only. Each call acquires a pooled connection for the
//! duration of one statement (or one transaction) and releases it on every
//! exit path.

use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

use super::init::{create_schema, open_pool};
use super::models::{PlatformTotals, Totals};
use crate::record::NormalizedRecord;
use crate::Result;

/// Handle on the `ad_performance` store
#[derive(Debug, Clone)]
pub struct StorageManager {
    pool: SqlitePool,
}

impl StorageManager {
    /// Open (or create) the SQLite file at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = open_pool(db_path).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Ensure the table and both composite indexes exist
    pub async fn initialize(&self) -> Result<()> {
        create_schema(&self.pool).await
    }

    /// Append all records inside one transaction
    ///
    /// Either every row is persisted or none is: the transaction rolls back
    /// when dropped without `commit`. Empty input does not touch the database.
    pub async fn insert_records(&self, records: &[NormalizedRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO ad_performance (
                    platform, campaign_id, campaign_name, event_date,
                    impressions, clicks, spend, conversions, revenue
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.platform)
            .bind(&record.campaign_id)
            .bind(&record.campaign_name)
            .bind(record.event_date_key())
            .bind(record.impressions)
            .bind(record.clicks)
            .bind(record.spend)
            .bind(record.conversions)
            .bind(record.revenue)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(rows = records.len(), "Inserted normalized records");
        Ok(records.len())
    }

    /// One row per platform with row count and metric sums, ordered by platform
    pub async fn fetch_summary(&self) -> Result<Vec<PlatformTotals>> {
        let rows = sqlx::query_as::<_, PlatformTotals>(
            r#"
            SELECT
                platform,
                COUNT(*) AS rows_ingested,
                COALESCE(SUM(impressions), 0) AS impressions,
                COALESCE(SUM(clicks), 0) AS clicks,
                COALESCE(SUM(spend), 0.0) AS spend,
                COALESCE(SUM(conversions), 0) AS conversions,
                COALESCE(SUM(revenue), 0.0) AS revenue
            FROM ad_performance
            GROUP BY platform
            ORDER BY platform
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(platforms = rows.len(), "Fetched platform summary");
        Ok(rows)
    }

    /// Same aggregation as `fetch_summary` across the whole table
    pub async fn fetch_totals(&self) -> Result<Totals> {
        let totals = sqlx::query_as::<_, Totals>(
            r#"
            SELECT
                COUNT(*) AS rows_ingested,
                COALESCE(SUM(impressions), 0) AS impressions,
                COALESCE(SUM(clicks), 0) AS clicks,
                COALESCE(SUM(spend), 0.0) AS spend,
                COALESCE(SUM(conversions), 0) AS conversions,
                COALESCE(SUM(revenue), 0.0) AS revenue
            FROM ad_performance
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    pub async fn row_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ad_performance")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
