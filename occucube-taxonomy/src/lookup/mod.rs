//! Taxonomy lookup service abstraction
//!
//! The mapping builder only ever asks one question: "what is the metadata of
//! key K?". Implementations decide how to answer it (remote API, cache,
//! nothing at all), and [`resolve_many`] fans a set of keys out over any
//! implementation with bounded concurrency, a per-key timeout and a global
//! deadline.

pub mod cache;
pub mod gbif;

pub use cache::CachedLookup;
pub use gbif::GbifClient;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use occucube_core::config::LookupConfig;
use occucube_core::{CubeResult, LookupSummary, TaxonKey};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::record::TaxonMetadata;
use crate::resilience::RetryPolicy;

/// Resolve metadata for a taxon key
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    /// `Ok(None)` means the service has no record for the key
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>>;
}

#[async_trait]
impl<T: TaxonomyLookup + ?Sized> TaxonomyLookup for Arc<T> {
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        (**self).resolve(key).await
    }
}

#[async_trait]
impl<T: TaxonomyLookup + ?Sized> TaxonomyLookup for &T {
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        (**self).resolve(key).await
    }
}

/// Lookup that never has metadata; used when remote lookups are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

#[async_trait]
impl TaxonomyLookup for OfflineLookup {
    async fn resolve(&self, _key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        Ok(None)
    }
}

/// Limits applied when resolving many keys
#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub max_concurrency: usize,
    /// Upper bound for a single `resolve` call, retries included
    pub per_key_timeout: Duration,
    /// Keys not started before this much time has passed are marked failed
    pub deadline: Option<Duration>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

impl LookupOptions {
    pub fn from_config(config: &LookupConfig) -> Self {
        let retry = RetryPolicy::for_network(config.max_retries);
        Self {
            max_concurrency: config.max_concurrency.max(1),
            per_key_timeout: retry.worst_case(Duration::from_secs(config.timeout_secs)),
            deadline: Some(Duration::from_secs(config.deadline_secs)),
        }
    }
}

/// Outcome of resolving a set of keys
#[derive(Debug, Clone, Default)]
pub struct LookupReport {
    pub resolved: BTreeMap<TaxonKey, TaxonMetadata>,
    pub not_found: BTreeSet<TaxonKey>,
    pub failed: BTreeSet<TaxonKey>,
}

impl LookupReport {
    pub fn get(&self, key: TaxonKey) -> Option<&TaxonMetadata> {
        self.resolved.get(&key)
    }

    pub fn summary(&self) -> LookupSummary {
        LookupSummary {
            requested: self.resolved.len() + self.not_found.len() + self.failed.len(),
            resolved: self.resolved.len(),
            not_found: self.not_found.len(),
            failed: self.failed.len(),
        }
    }

    /// Whether any resolved key carried an accepted key at all
    pub fn exposes_accepted_keys(&self) -> bool {
        self.resolved.values().any(|meta| meta.accepted_key.is_some())
    }

    pub fn merge(&mut self, other: LookupReport) {
        self.resolved.extend(other.resolved);
        self.not_found.extend(other.not_found);
        self.failed.extend(other.failed);
    }
}

enum Outcome {
    Resolved(TaxonMetadata),
    NotFound,
    Failed,
}

/// Resolve every key, tolerating per-key failures
pub async fn resolve_many<L, I>(lookup: &L, keys: I, options: &LookupOptions) -> LookupReport
where
    L: TaxonomyLookup + ?Sized,
    I: IntoIterator<Item = TaxonKey>,
{
    resolve_many_with_progress(lookup, keys, options, |_| {}).await
}

/// Same as [`resolve_many`], calling `on_done` once per finished key
pub async fn resolve_many_with_progress<L, I, F>(
    lookup: &L,
    keys: I,
    options: &LookupOptions,
    on_done: F,
) -> LookupReport
where
    L: TaxonomyLookup + ?Sized,
    I: IntoIterator<Item = TaxonKey>,
    F: Fn(TaxonKey) + Sync,
{
    let keys: BTreeSet<TaxonKey> = keys.into_iter().collect();
    let deadline = options.deadline.map(|d| Instant::now() + d);
    let on_done = &on_done;

    let outcomes: Vec<(TaxonKey, Outcome)> = stream::iter(keys.iter().copied())
        .map(|key| async move {
            let limit = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        tracing::warn!("Lookup deadline passed, skipping taxon {}", key);
                        on_done(key);
                        return (key, Outcome::Failed);
                    }
                    options.per_key_timeout.min(remaining)
                }
                None => options.per_key_timeout,
            };

            let outcome = match tokio::time::timeout(limit, lookup.resolve(key)).await {
                Ok(Ok(Some(meta))) => Outcome::Resolved(meta),
                Ok(Ok(None)) => {
                    tracing::debug!("No taxonomy record for {}", key);
                    Outcome::NotFound
                }
                Ok(Err(e)) => {
                    tracing::warn!("Lookup of taxon {} failed: {}", key, e);
                    Outcome::Failed
                }
                Err(_) => {
                    tracing::warn!("Lookup of taxon {} timed out after {:?}", key, limit);
                    Outcome::Failed
                }
            };
            on_done(key);
            (key, outcome)
        })
        .buffer_unordered(options.max_concurrency.max(1))
        .collect()
        .await;

    let mut report = LookupReport::default();
    for (key, outcome) in outcomes {
        match outcome {
            Outcome::Resolved(meta) => {
                report.resolved.insert(key, meta);
            }
            Outcome::NotFound => {
                report.not_found.insert(key);
            }
            Outcome::Failed => {
                report.failed.insert(key);
            }
        }
    }

    tracing::debug!(
        "Resolved {} keys: {} found, {} missing, {} failed",
        keys.len(),
        report.resolved.len(),
        report.not_found.len(),
        report.failed.len()
    );

    report
}
