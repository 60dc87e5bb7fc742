pub mod build;
pub mod classify;
pub mod lookup;

use anyhow::{Context, Result};
use occucube_core::config::LookupConfig;
use occucube_taxonomy::{GbifClient, OfflineLookup, TaxonomyLookup};

/// Pick the lookup backend: nothing when offline or disabled, GBIF otherwise
pub fn lookup_service(config: &LookupConfig, offline: bool) -> Result<Box<dyn TaxonomyLookup>> {
    if offline || !config.enabled {
        tracing::info!("Taxonomy lookups disabled; mapping metadata will be empty");
        return Ok(Box::new(OfflineLookup));
    }

    let client = GbifClient::from_config(config)
        .with_context(|| format!("Failed to create lookup client for {}", config.base_url))?;
    Ok(Box::new(client))
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("Failed to start async runtime")
}
