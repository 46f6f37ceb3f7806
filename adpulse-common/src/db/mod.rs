//! SQLite persistence for normalized records

pub mod aggregates;
pub mod init;
pub mod metrics;
pub mod models;
pub mod storage;

pub use aggregates::MetricsFilter;
pub use init::{create_schema, open_pool, AD_PERFORMANCE_TABLE};
pub use metrics::{calc_ctr, calc_rate, DerivedRatios};
pub use models::*;
pub use storage::StorageManager;
