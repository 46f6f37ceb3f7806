//! Ingestion errors

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

/// Why an event date could not be read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    #[error("event date is missing")]
    Missing,

    #[error("unable to parse date value: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to read CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Mandatory date failure; `row` is 1-based, header excluded
    #[error("Row {row}: {source}")]
    Date {
        row: usize,
        #[source]
        source: DateError,
    },

    #[error("Unsupported platform '{slug}'. Supported: {}", supported.join(", "))]
    UnsupportedPlatform { slug: String, supported: Vec<String> },

    #[error("CSV read task failed: {0}")]
    ReadTask(#[from] tokio::task::JoinError),

    #[error("Invalid connector: {0}")]
    InvalidConnector(String),

    #[error(transparent)]
    Storage(#[from] adpulse_common::Error),
}
