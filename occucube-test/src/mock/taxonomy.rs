//! Scriptable taxonomy lookup for testing
//!
//! Answers from an in-memory table, can be told to fail for chosen keys, and
//! counts how often each key was queried.

use async_trait::async_trait;
use occucube_core::{CubeError, CubeResult, TaxonKey, TaxonRank, TaxonomicStatus};
use occucube_taxonomy::{TaxonMetadata, TaxonomyLookup};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockTaxonomyLookup {
    entries: HashMap<TaxonKey, TaxonMetadata>,
    failing: HashSet<TaxonKey>,
    calls: Mutex<HashMap<TaxonKey, usize>>,
}

impl MockTaxonomyLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: TaxonMetadata) -> Self {
        self.entries.insert(metadata.key, metadata);
        self
    }

    /// Accepted taxon with the given name and rank
    pub fn with_taxon(self, key: u64, name: &str, rank: TaxonRank) -> Self {
        self.with_metadata(
            TaxonMetadata::new(TaxonKey(key), name)
                .with_rank(rank)
                .with_status(TaxonomicStatus::Accepted),
        )
    }

    /// Key that the service reports as a synonym of `accepted`
    pub fn with_synonym(self, key: u64, name: &str, rank: TaxonRank, accepted: u64, accepted_name: &str) -> Self {
        self.with_metadata(
            TaxonMetadata::new(TaxonKey(key), name)
                .with_rank(rank)
                .with_status(TaxonomicStatus::Synonym)
                .with_accepted(TaxonKey(accepted), accepted_name),
        )
    }

    /// Make lookups of `key` fail with a network error
    pub fn with_failure(mut self, key: u64) -> Self {
        self.failing.insert(TaxonKey(key));
        self
    }

    pub fn calls(&self, key: u64) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.get(&TaxonKey(key)).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.values().sum()).unwrap_or(0)
    }
}

#[async_trait]
impl TaxonomyLookup for MockTaxonomyLookup {
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls.entry(key).or_insert(0) += 1;
        }
        if self.failing.contains(&key) {
            return Err(CubeError::Network(format!("mock failure for {}", key)));
        }
        Ok(self.entries.get(&key).cloned())
    }
}
