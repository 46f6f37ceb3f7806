//! Platform connectors
//!
//! Each connector maps one platform's export columns onto
//! [`NormalizedRecord`]. CSV reading is shared; only the per-row mapping
//! differs between platforms.

mod google;
mod meta;
mod tiktok;

pub use google::GoogleAdsConnector;
pub use meta::MetaAdsConnector;
pub use tiktok::TikTokAdsConnector;

use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{DateError, IngestError, Result};
use crate::parsers::parse_float;
use adpulse_common::NormalizedRecord;

/// Value credited per conversion when an export carries no revenue column
pub const DEFAULT_CONVERSION_VALUE: f64 = 25.0;

pub const UNKNOWN_CAMPAIGN: &str = "Unknown Campaign";

const UTF8_BOM: char = '\u{feff}';

/// Identity of an ad platform: lowercase slug plus display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    slug: String,
    name: String,
}

impl Platform {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let slug = slug.into();
        let name = name.into();
        if slug.trim().is_empty() {
            return Err(IngestError::InvalidConnector(
                "connector must define a platform slug".to_string(),
            ));
        }
        if name.trim().is_empty() {
            return Err(IngestError::InvalidConnector(format!(
                "connector '{}' must define a platform name",
                slug
            )));
        }
        Ok(Self { slug, name })
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One CSV data row keyed by (trimmed) header
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value of the first key whose cell is non-empty
    pub fn first_present(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.get(key))
            .find(|value| !value.is_empty())
    }

    /// True when every cell is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }
}

/// Platform adapter from raw export rows to normalized records
pub trait Connector: Send + Sync {
    fn platform(&self) -> &Platform;

    /// Map one row; only the event date may fail
    fn normalize_row(&self, row: &RawRow) -> std::result::Result<NormalizedRecord, DateError>;

    /// Map every row, aborting on the first date failure
    fn normalize_rows(&self, rows: &[RawRow]) -> Result<Vec<NormalizedRecord>> {
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                self.normalize_row(row).map_err(|source| IngestError::Date {
                    row: index + 1,
                    source,
                })
            })
            .collect()
    }

    fn load_file(&self, path: &Path) -> Result<Vec<NormalizedRecord>> {
        let rows = read_rows(path)?;
        debug!(
            platform = self.platform().slug(),
            rows = rows.len(),
            "Read CSV rows from {}",
            path.display()
        );
        self.normalize_rows(&rows)
    }
}

/// Read a headed CSV file into rows, dropping rows with no content
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>> {
    if !path.exists() {
        return Err(IngestError::FileNotFound(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim_start_matches(UTF8_BOM).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let row = RawRow::from_pairs(headers.iter().cloned().zip(record.iter()));
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

fn csv_error(path: &Path, source: csv::Error) -> IngestError {
    IngestError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Trimmed campaign name, or [`UNKNOWN_CAMPAIGN`]
pub(crate) fn campaign_name(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_CAMPAIGN)
        .to_string()
}

/// First non-empty revenue column, else conversions at the default value
pub(crate) fn resolve_revenue(row: &RawRow, keys: &[&str], conversions: i64) -> f64 {
    match row.first_present(keys) {
        Some(value) => parse_float(Some(value), 0.0),
        None => conversions as f64 * DEFAULT_CONVERSION_VALUE,
    }
}
