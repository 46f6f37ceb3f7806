//! Ingestion orchestrator: CSV file → connector → store

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::connectors::read_rows;
use crate::error::Result;
use crate::registry::ConnectorRegistry;
use adpulse_common::db::PlatformTotals;
use adpulse_common::StorageManager;

/// Outcome of one `ingest_file` call
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReport {
    pub platform_name: String,
    pub source_path: PathBuf,
    pub rows_ingested: usize,
}

#[derive(Debug)]
pub struct DataIngestor {
    registry: ConnectorRegistry,
    storage: StorageManager,
}

impl DataIngestor {
    /// Ensures the schema exists before returning
    pub async fn new(registry: ConnectorRegistry, storage: StorageManager) -> Result<Self> {
        storage.initialize().await?;
        Ok(Self { registry, storage })
    }

    /// Normalize every row of `csv_path` and append them in one transaction
    ///
    /// Nothing is written if any row fails to normalize. The file is read on
    /// the blocking pool so the runtime keeps serving other tasks.
    pub async fn ingest_file(&self, platform_slug: &str, csv_path: &Path) -> Result<IngestionReport> {
        let connector = self.registry.get(platform_slug)?;

        let path = csv_path.to_path_buf();
        let rows = tokio::task::spawn_blocking(move || read_rows(&path)).await??;
        debug!(platform = platform_slug, rows = rows.len(), "Read {}", csv_path.display());

        let records = connector.normalize_rows(&rows)?;
        let rows_ingested = self.storage.insert_records(&records).await?;

        let platform_name = connector.platform().name().to_string();
        info!(
            platform = %platform_name,
            rows = rows_ingested,
            "Ingested {}",
            csv_path.display()
        );

        Ok(IngestionReport {
            platform_name,
            source_path: csv_path.to_path_buf(),
            rows_ingested,
        })
    }

    pub async fn summary_rows(&self) -> Result<Vec<PlatformTotals>> {
        Ok(self.storage.fetch_summary().await?)
    }

    pub async fn table_row_count(&self) -> Result<i64> {
        Ok(self.storage.row_count().await?)
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }
}
