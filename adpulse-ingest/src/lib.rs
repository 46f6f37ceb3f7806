//! # AdPulse Ingestion
//!
//! Turns platform CSV exports into [`NormalizedRecord`]s and persists them.
//!
//! - [`parsers`]: lenient numeric parsing, strict date parsing
//! - [`identifiers`]: stable campaign ids
//! - [`connectors`]: one adapter per ad platform
//! - [`registry`]: slug lookup over the available connectors
//! - [`orchestrator`]: file → connector → store

pub mod connectors;
pub mod error;
pub mod identifiers;
pub mod orchestrator;
pub mod parsers;
pub mod registry;

pub use adpulse_common::NormalizedRecord;
pub use connectors::{Connector, Platform, RawRow};
pub use error::{IngestError, Result};
pub use orchestrator::{DataIngestor, IngestionReport};
pub use registry::ConnectorRegistry;
