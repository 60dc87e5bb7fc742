//! Bucket aggregation: occurrences to (year, cell, key) cube cells
//!
//! Rows are filtered on the bucket's grouping column, folded in parallel
//! into per-cell accumulators and emitted sorted by (year, cell, key) with
//! missing values first, so output order never depends on thread timing.

use occucube_core::TaxonKey;
use occucube_taxonomy::Bucket;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::occurrence::OccurrenceRecord;

/// One aggregated cube row
#[derive(Debug, Clone, PartialEq)]
pub struct CubeCell {
    pub year: Option<i64>,
    pub cell: Option<String>,
    pub key: TaxonKey,
    pub count: u64,
    /// Smallest non-null uncertainty of the contributing rows
    pub min_uncertainty: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct CellKey {
    year: Option<i64>,
    cell: Option<String>,
    key: TaxonKey,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    count: u64,
    min: Option<f64>,
}

impl Accumulator {
    fn add(&mut self, uncertainty: Option<f64>) {
        self.count += 1;
        self.min = min_option(self.min, uncertainty);
    }

    fn merge(&mut self, other: Accumulator) {
        self.count += other.count;
        self.min = min_option(self.min, other.min);
    }
}

/// Minimum that ignores nulls; null only when both sides are null
pub fn min_option(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Aggregated cells of one bucket
#[derive(Debug, Clone, PartialEq)]
pub struct PartialCube {
    pub bucket: Bucket,
    /// Name of the occurrence column the cells are keyed on
    pub key_column: &'static str,
    pub cells: Vec<CubeCell>,
    /// Occurrence rows that matched the bucket
    pub occurrences: usize,
    /// Bucket keys that matched at least one occurrence
    pub matched_keys: BTreeSet<TaxonKey>,
}

impl PartialCube {
    pub fn empty(bucket: Bucket) -> Self {
        Self {
            bucket,
            key_column: bucket.grouping_column(),
            cells: Vec::new(),
            occurrences: 0,
            matched_keys: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> BTreeSet<TaxonKey> {
        self.cells.iter().map(|c| c.key).collect()
    }

    /// Replace keys per `remap`, re-aggregating cells that collide
    pub fn remap(self, remap: &BTreeMap<TaxonKey, TaxonKey>) -> Self {
        if remap.is_empty() {
            return self;
        }

        let mut merged: BTreeMap<CellKey, Accumulator> = BTreeMap::new();
        for cell in self.cells {
            let key = remap.get(&cell.key).copied().unwrap_or(cell.key);
            merged
                .entry(CellKey { year: cell.year, cell: cell.cell, key })
                .or_default()
                .merge(Accumulator { count: cell.count, min: cell.min_uncertainty });
        }

        Self {
            cells: into_cells(merged),
            ..self
        }
    }
}

fn into_cells(groups: BTreeMap<CellKey, Accumulator>) -> Vec<CubeCell> {
    groups
        .into_iter()
        .map(|(k, acc)| CubeCell {
            year: k.year,
            cell: k.cell,
            key: k.key,
            count: acc.count,
            min_uncertainty: acc.min,
        })
        .collect()
}

/// Aggregate the occurrences whose grouping key is in `keys`
pub fn aggregate_bucket(
    bucket: Bucket,
    keys: &BTreeSet<TaxonKey>,
    occurrences: &[OccurrenceRecord],
) -> PartialCube {
    if keys.is_empty() {
        tracing::debug!("No {} taxa of interest, skipping aggregation", bucket);
        return PartialCube::empty(bucket);
    }

    let groups: HashMap<CellKey, Accumulator> = occurrences
        .par_iter()
        .filter_map(|occ| {
            let key = occ.grouping_key(bucket)?;
            keys.contains(&key).then_some((key, occ))
        })
        .fold(HashMap::new, |mut acc: HashMap<CellKey, Accumulator>, (key, occ)| {
            acc.entry(CellKey {
                year: occ.year,
                cell: occ.cell.clone(),
                key,
            })
            .or_default()
            .add(occ.uncertainty);
            acc
        })
        .reduce(HashMap::new, |mut left, right| {
            for (k, v) in right {
                left.entry(k).or_default().merge(v);
            }
            left
        });

    let sorted: BTreeMap<CellKey, Accumulator> = groups.into_iter().collect();
    let occurrences_used = sorted.values().map(|acc| acc.count as usize).sum();
    let matched_keys = sorted.keys().map(|k| k.key).collect();
    let cells = into_cells(sorted);

    if cells.is_empty() {
        tracing::info!(
            "{} bucket: none of {} keys matched an occurrence in column {}",
            bucket,
            keys.len(),
            bucket.grouping_column()
        );
    } else {
        tracing::debug!(
            "{} bucket: {} occurrences in {} cube cells",
            bucket,
            occurrences_used,
            cells.len()
        );
    }

    PartialCube {
        bucket,
        key_column: bucket.grouping_column(),
        cells,
        occurrences: occurrences_used,
        matched_keys,
    }
}
