//! # AdPulse Common Library
//!
//! Shared code for the AdPulse crates:
//! - Canonical ad-performance record
//! - SQLite storage (schema, bulk insert, grouped aggregation)
//! - Derived ratio helpers
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod record;

pub use db::StorageManager;
pub use error::{Error, Result};
pub use record::NormalizedRecord;
