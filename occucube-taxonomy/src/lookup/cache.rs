/// In-memory memoization of taxonomy lookups
use async_trait::async_trait;
use dashmap::DashMap;
use occucube_core::{CubeResult, TaxonKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::TaxonomyLookup;
use crate::record::TaxonMetadata;

/// Caches answers of an inner lookup, including "no record".
/// Failures are not cached, so a later call may still succeed.
/// Concurrent callers for the same key share one inner call.
pub struct CachedLookup<L> {
    inner: L,
    entries: DashMap<TaxonKey, Arc<OnceCell<Option<TaxonMetadata>>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<L: TaxonomyLookup> CachedLookup<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    /// Number of keys with a cached answer
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.value().initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (hits, misses)
    pub fn stats(&self) -> (usize, usize) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }
}

#[async_trait]
impl<L: TaxonomyLookup> TaxonomyLookup for CachedLookup<L> {
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        // clone the cell out so no map guard is held across the await
        let cell = self.entries.entry(key).or_default().value().clone();

        let mut fetched = false;
        let answer = cell
            .get_or_try_init(|| {
                fetched = true;
                self.inner.resolve(key)
            })
            .await;

        if fetched {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        answer.cloned()
    }
}
