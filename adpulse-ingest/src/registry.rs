//! Slug → connector lookup

use std::collections::BTreeMap;

use crate::connectors::{Connector, GoogleAdsConnector, MetaAdsConnector, TikTokAdsConnector};
use crate::error::{IngestError, Result};

/// Connectors keyed by lowercase platform slug
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: BTreeMap<String, Box<dyn Connector>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the Google, Meta and TikTok connectors
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(GoogleAdsConnector::new()?));
        registry.register(Box::new(MetaAdsConnector::new()?));
        registry.register(Box::new(TikTokAdsConnector::new()?));
        Ok(registry)
    }

    /// Add a connector, replacing any previous one with the same slug
    pub fn register(&mut self, connector: Box<dyn Connector>) {
        let slug = connector.platform().slug().to_lowercase();
        self.connectors.insert(slug, connector);
    }

    /// Case-insensitive lookup
    pub fn get(&self, slug: &str) -> Result<&dyn Connector> {
        self.connectors
            .get(&slug.to_lowercase())
            .map(|connector| connector.as_ref())
            .ok_or_else(|| IngestError::UnsupportedPlatform {
                slug: slug.to_string(),
                supported: self.supported_platforms(),
            })
    }

    /// Registered slugs in sorted order
    pub fn supported_platforms(&self) -> Vec<String> {
        self.connectors.keys().cloned().collect()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.connectors.contains_key(&slug.to_lowercase())
    }
}

impl std::fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("platforms", &self.supported_platforms())
            .finish()
    }
}
