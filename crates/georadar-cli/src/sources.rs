//! Adapter selection for the composition root

use chrono::{DateTime, Utc};
use georadar_core::config::LayeredConfig;
use georadar_core::ports::SignalCatalog;
use georadar_store::fixtures::demo_signals;
use georadar_store::{HttpSignalCatalog, JsonFileCatalog, StaticSignalCatalog};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::CatalogArgs;

/// Where the signal catalog comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Built-in demo signals stamped relative to startup
    Fixture,
    File(PathBuf),
    Http(String),
}

impl CatalogSource {
    /// `--catalog` wins; otherwise the layered `catalog_url` (which already
    /// includes `--catalog-url`); otherwise the demo fixture.
    pub fn resolve(args: &CatalogArgs, config: &LayeredConfig) -> Self {
        if let Some(path) = &args.catalog {
            return CatalogSource::File(path.clone());
        }
        match &config.catalog_url.value {
            Some(url) => CatalogSource::Http(url.clone()),
            None => CatalogSource::Fixture,
        }
    }

    pub fn open(&self, now: DateTime<Utc>) -> Arc<dyn SignalCatalog> {
        match self {
            CatalogSource::Fixture => Arc::new(StaticSignalCatalog::new(demo_signals(now))),
            CatalogSource::File(path) => Arc::new(JsonFileCatalog::new(path.clone())),
            CatalogSource::Http(url) => Arc::new(HttpSignalCatalog::new(url.clone())),
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Fixture => write!(f, "built-in demo signals"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
            CatalogSource::Http(url) => write!(f, "{}", url),
        }
    }
}
