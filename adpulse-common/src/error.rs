//! Common error types for AdPulse

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for AdPulse storage and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared by the ingestion, API and CLI crates
#[derive(Error, Debug)]
pub enum Error {
    /// Query or transaction failure against an already-open store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The store itself could not be opened
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML configuration file present but unreadable
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Invalid caller-supplied value (filter, date range, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A persisted value does not match the format the store guarantees
    #[error("Stored data is malformed: {0}")]
    Integrity(String),
}
