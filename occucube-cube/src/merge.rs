//! Cube merger
//!
//! Each bucket keys its cells on a different occurrence column; the merged
//! tables key everything on one shared `taxonKey` column. Canonical keys of
//! different buckets must not coincide: a key claimed by two buckets would
//! produce duplicate cube rows, so it aborts the merge.

use occucube_core::{CubeError, CubeResult, TaxonKey};
use occucube_taxonomy::Bucket;
use std::collections::{BTreeMap, BTreeSet};

use crate::aggregate::{CubeCell, PartialCube};
use crate::mapping::{BucketMapping, MappingEntry};

/// Name of the taxon dimension in the merged tables
pub const CANONICAL_KEY_COLUMN: &str = "taxonKey";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cube {
    pub key_column: &'static str,
    pub cells: Vec<CubeCell>,
    /// Rows contributed by each bucket
    pub rows_per_bucket: BTreeMap<Bucket, usize>,
}

impl Cube {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn keys(&self) -> BTreeSet<TaxonKey> {
        self.cells.iter().map(|c| c.key).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingTable {
    pub key_column: &'static str,
    pub entries: Vec<MappingEntry>,
}

impl MappingTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: TaxonKey) -> Option<&MappingEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Fail on the first key present in more than one bucket
fn check_disjoint(kind: &str, parts: &[(Bucket, BTreeSet<TaxonKey>)]) -> CubeResult<()> {
    let mut owner: BTreeMap<TaxonKey, Bucket> = BTreeMap::new();
    for (bucket, keys) in parts {
        for key in keys {
            if let Some(previous) = owner.insert(*key, *bucket) {
                return Err(CubeError::InvariantViolation(format!(
                    "{} key {} appears in both the {} and {} buckets",
                    kind, key, previous, bucket
                )));
            }
        }
    }
    Ok(())
}

/// Concatenate the partial cubes in bucket order under one key column
pub fn merge_cubes(parts: Vec<PartialCube>) -> CubeResult<Cube> {
    let keys: Vec<(Bucket, BTreeSet<TaxonKey>)> = parts.iter().map(|p| (p.bucket, p.keys())).collect();
    check_disjoint("cube", &keys)?;

    let mut cube = Cube {
        key_column: CANONICAL_KEY_COLUMN,
        ..Default::default()
    };
    for part in parts {
        if part.key_column != CANONICAL_KEY_COLUMN {
            tracing::debug!(
                "{} bucket: renaming {} to {}",
                part.bucket,
                part.key_column,
                CANONICAL_KEY_COLUMN
            );
        }
        cube.rows_per_bucket.insert(part.bucket, part.cells.len());
        cube.cells.extend(part.cells);
    }

    Ok(cube)
}

/// Concatenate the bucket mappings in bucket order under one key column
pub fn merge_mappings(parts: Vec<BucketMapping>) -> CubeResult<MappingTable> {
    let keys: Vec<(Bucket, BTreeSet<TaxonKey>)> = parts.iter().map(|p| (p.bucket, p.keys())).collect();
    check_disjoint("mapping", &keys)?;

    Ok(MappingTable {
        key_column: CANONICAL_KEY_COLUMN,
        entries: parts.into_iter().flat_map(|p| p.entries).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn part(bucket: Bucket, keys: &[u64]) -> PartialCube {
        let mut p = PartialCube::empty(bucket);
        p.cells = keys
            .iter()
            .map(|k| CubeCell {
                year: Some(2020),
                cell: Some("E1".into()),
                key: TaxonKey(*k),
                count: 1,
                min_uncertainty: None,
            })
            .collect();
        p
    }

    fn mapping(bucket: Bucket, keys: &[u64]) -> BucketMapping {
        let mut m = BucketMapping::empty(bucket);
        m.entries = keys
            .iter()
            .map(|k| MappingEntry {
                key: TaxonKey(*k),
                scientific_name: None,
                rank: None,
                taxonomic_status: None,
                includes: vec![k.to_string()],
            })
            .collect();
        m
    }

    #[test]
    fn test_concatenates_in_bucket_order() {
        let cube = merge_cubes(vec![
            part(Bucket::Species, &[1, 2]),
            part(Bucket::Infraspecific, &[5]),
            part(Bucket::Synonym, &[99]),
        ])
        .unwrap();

        assert_eq!(cube.key_column, "taxonKey");
        assert_eq!(cube.cells.iter().map(|c| c.key.0).collect::<Vec<_>>(), vec![1, 2, 5, 99]);
        assert_eq!(cube.rows_per_bucket[&Bucket::Infraspecific], 1);
    }

    #[test]
    fn test_empty_buckets_are_tolerated() {
        let cube = merge_cubes(vec![
            PartialCube::empty(Bucket::Species),
            part(Bucket::Infraspecific, &[5]),
            PartialCube::empty(Bucket::Synonym),
        ])
        .unwrap();
        assert_eq!(cube.len(), 1);

        let table = merge_mappings(vec![BucketMapping::empty(Bucket::Species)]).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_overlapping_keys_abort() {
        let err = merge_cubes(vec![part(Bucket::Species, &[5]), part(Bucket::Infraspecific, &[5])])
            .unwrap_err();
        match err {
            CubeError::InvariantViolation(msg) => {
                assert_eq!(msg, "cube key 5 appears in both the species and infraspecific buckets")
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = merge_mappings(vec![mapping(Bucket::Species, &[1]), mapping(Bucket::Synonym, &[1])])
            .unwrap_err();
        assert!(matches!(err, CubeError::InvariantViolation(_)));
    }

    #[test]
    fn test_mapping_lookup_by_key() {
        let table = merge_mappings(vec![mapping(Bucket::Species, &[1]), mapping(Bucket::Synonym, &[99])]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(TaxonKey(99)).map(|e| e.includes.clone()), Some(vec!["99".to_string()]));
        assert!(table.get(TaxonKey(3)).is_none());
    }
}
