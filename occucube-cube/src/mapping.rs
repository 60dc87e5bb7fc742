//! Taxon mapping builder
//!
//! For every canonical key of a bucket, records which raw identifiers (the
//! occurrences' `taxonKey` and `scientificName`) were folded into it and
//! attaches the canonical key's name, rank and status from the taxonomy
//! lookup.
//!
//! The raw-to-canonical relation is kept as an explicit index from canonical
//! key to its contributors in first-seen order. In the infraspecific bucket a
//! canonical key may itself turn out to be a synonym; its contributors then
//! move to the accepted key returned by the lookup.

use indexmap::{IndexMap, IndexSet};
use occucube_core::{LookupSummary, TaxonKey, TaxonRank, TaxonomicStatus};
use occucube_taxonomy::{
    resolve_many_with_progress, Bucket, LookupOptions, LookupReport, TaxonMetadata, TaxonomyLookup,
};
use std::collections::{BTreeMap, BTreeSet};
use tokio::time::Instant;

use crate::occurrence::OccurrenceRecord;

/// A raw identifier and the name it carried in the occurrence table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawIdentifier {
    pub key: TaxonKey,
    pub name: Option<String>,
}

/// Canonical key to contributing raw identifiers, both in first-seen order
pub type ContributorIndex = IndexMap<TaxonKey, IndexSet<RawIdentifier>>;

/// Distinct (grouping key, raw key, name) triples of the bucket's occurrences
///
/// Matched grouping keys whose rows all lack a `taxonKey` map to an empty set.
pub fn collect_contributors(
    bucket: Bucket,
    keys: &BTreeSet<TaxonKey>,
    occurrences: &[OccurrenceRecord],
) -> ContributorIndex {
    let mut index = ContributorIndex::new();
    if keys.is_empty() {
        return index;
    }

    for occ in occurrences {
        let Some(canonical) = occ.grouping_key(bucket).filter(|k| keys.contains(k)) else {
            continue;
        };
        // every key that reaches the cube gets an entry, even with no raw identifier
        let raws = index.entry(canonical).or_default();
        if let Some(raw) = occ.raw_key() {
            raws.insert(RawIdentifier {
                key: raw,
                name: occ.scientific_name.clone(),
            });
        }
    }

    index
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq)]
pub struct MappingEntry {
    pub key: TaxonKey,
    pub scientific_name: Option<String>,
    pub rank: Option<TaxonRank>,
    pub taxonomic_status: Option<TaxonomicStatus>,
    /// `"{rawKey}: {name}"` items, joined by the writer
    pub includes: Vec<String>,
}

impl MappingEntry {
    fn new(key: TaxonKey, metadata: Option<&TaxonMetadata>, contributors: &IndexSet<RawIdentifier>) -> Self {
        let resolved_name = metadata.and_then(|m| m.scientific_name.clone());
        let includes = contributors
            .iter()
            .map(|raw| {
                let name = raw
                    .name
                    .clone()
                    .or_else(|| (raw.key == key).then(|| resolved_name.clone()).flatten());
                match name {
                    Some(name) => format!("{}: {}", raw.key, name),
                    None => raw.key.to_string(),
                }
            })
            .collect();

        Self {
            key,
            scientific_name: resolved_name,
            rank: metadata.and_then(|m| m.rank.clone()),
            taxonomic_status: metadata.and_then(|m| m.taxonomic_status.clone()),
            includes,
        }
    }
}

/// Mapping table of one bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMapping {
    pub bucket: Bucket,
    /// Sorted by canonical key
    pub entries: Vec<MappingEntry>,
    /// Queried key to the accepted key that replaced it
    pub remapped: BTreeMap<TaxonKey, TaxonKey>,
    pub lookup: LookupSummary,
}

impl BucketMapping {
    pub fn empty(bucket: Bucket) -> Self {
        Self {
            bucket,
            entries: Vec::new(),
            remapped: BTreeMap::new(),
            lookup: LookupSummary::default(),
        }
    }

    pub fn keys(&self) -> BTreeSet<TaxonKey> {
        self.entries.iter().map(|e| e.key).collect()
    }
}

/// Receives lookup progress while mappings are built
pub trait LookupProgress: Sync {
    /// `count` more keys are about to be resolved
    fn queued(&self, count: usize);
    fn resolved(&self, key: TaxonKey);
}

impl LookupProgress for () {
    fn queued(&self, _count: usize) {}
    fn resolved(&self, _key: TaxonKey) {}
}

/// Builds bucket mappings against one lookup within one shared deadline
pub struct MappingBuilder<'a, L: TaxonomyLookup + ?Sized> {
    lookup: &'a L,
    options: LookupOptions,
    started: Instant,
    progress: &'a dyn LookupProgress,
}

impl<'a, L: TaxonomyLookup + ?Sized> MappingBuilder<'a, L> {
    pub fn new(lookup: &'a L, options: LookupOptions) -> Self {
        Self {
            lookup,
            options,
            started: Instant::now(),
            progress: &(),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn LookupProgress) -> Self {
        self.progress = progress;
        self
    }

    /// Options whose deadline is what remains of the phase budget
    fn remaining_options(&self) -> LookupOptions {
        let mut options = self.options.clone();
        options.deadline = self
            .options
            .deadline
            .map(|d| d.saturating_sub(self.started.elapsed()));
        options
    }

    async fn resolve(&self, keys: BTreeSet<TaxonKey>) -> LookupReport {
        let options = self.remaining_options();
        self.progress.queued(keys.len());
        resolve_many_with_progress(self.lookup, keys, &options, |key| self.progress.resolved(key)).await
    }

    pub async fn build(&self, bucket: Bucket, contributors: ContributorIndex) -> BucketMapping {
        if contributors.is_empty() {
            return BucketMapping::empty(bucket);
        }

        let mut report = self.resolve(contributors.keys().copied().collect()).await;

        let mut remapped = BTreeMap::new();
        if bucket.follows_accepted_key() && report.exposes_accepted_keys() {
            for key in contributors.keys() {
                if let Some(accepted) = report.get(*key).and_then(TaxonMetadata::redirect) {
                    remapped.insert(*key, accepted);
                }
            }

            let unresolved: BTreeSet<TaxonKey> = remapped
                .values()
                .copied()
                .filter(|k| {
                    report.get(*k).is_none()
                        && !report.not_found.contains(k)
                        && !report.failed.contains(k)
                })
                .collect();
            if !unresolved.is_empty() {
                tracing::debug!(
                    "{} bucket: resolving {} accepted keys",
                    bucket,
                    unresolved.len()
                );
                let accepted = self.resolve(unresolved).await;
                report.merge(accepted);
            }

            for (from, to) in &remapped {
                tracing::info!("{} bucket: taxon {} is a synonym, using accepted key {}", bucket, from, to);
            }
        } else if bucket.follows_accepted_key() {
            tracing::debug!("{} bucket: lookup exposed no accepted keys, keys kept as-is", bucket);
        }

        let mut folded = ContributorIndex::new();
        for (key, raws) in contributors {
            let canonical = remapped.get(&key).copied().unwrap_or(key);
            folded.entry(canonical).or_default().extend(raws);
        }

        let mut entries: Vec<MappingEntry> = folded
            .iter()
            .map(|(key, raws)| MappingEntry::new(*key, report.get(*key), raws))
            .collect();
        entries.sort_by_key(|e| e.key);

        let missing = entries.iter().filter(|e| e.scientific_name.is_none()).count();
        if missing > 0 {
            tracing::warn!(
                "{} bucket: {} of {} taxa have no metadata from the lookup service",
                bucket,
                missing,
                entries.len()
            );
        }

        BucketMapping {
            bucket,
            entries,
            remapped,
            lookup: report.summary(),
        }
    }
}
