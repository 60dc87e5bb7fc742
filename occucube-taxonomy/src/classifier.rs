//! Partitioning of taxa of interest into resolution buckets
//!
//! Every taxon lands in at most one bucket. The bucket decides which
//! occurrence column is used as the cube's taxon dimension:
//!
//! | Bucket | Rank | Status | Grouping column |
//! |---|---|---|---|
//! | species | SPECIES | ACCEPTED, DOUBTFUL | `speciesKey` |
//! | infraspecific | below species | ACCEPTED, DOUBTFUL | `acceptedTaxonKey` |
//! | synonym | any | synonym family | `taxonKey` |
//!
//! Accepted or doubtful names at any other rank (GENUS, FAMILY, ...) fall in
//! no bucket and are reported as classification gaps.

use occucube_core::{ClassificationGap, GapReason, TaxonKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::record::TaxonOfInterest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Species,
    Infraspecific,
    Synonym,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Species, Bucket::Infraspecific, Bucket::Synonym];

    /// Occurrence column whose value is the bucket's canonical key
    pub fn grouping_column(self) -> &'static str {
        match self {
            Bucket::Species => "speciesKey",
            Bucket::Infraspecific => "acceptedTaxonKey",
            Bucket::Synonym => "taxonKey",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Bucket::Species => "species",
            Bucket::Infraspecific => "infraspecific",
            Bucket::Synonym => "synonym",
        }
    }

    /// Whether canonical keys of this bucket follow the lookup's accepted key
    pub fn follows_accepted_key(self) -> bool {
        matches!(self, Bucket::Infraspecific)
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of classifying one taxon of interest
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Assigned { bucket: Bucket, key: TaxonKey },
    Gap(GapReason),
}

/// Classify one taxon; this is the only place the bucket predicates live
pub fn classify(taxon: &TaxonOfInterest) -> Classification {
    let Some(rank) = taxon.rank.as_ref() else {
        return Classification::Gap(GapReason::MissingRank);
    };
    let Some(status) = taxon.taxonomic_status.as_ref() else {
        return Classification::Gap(GapReason::MissingStatus);
    };
    let Some(own_key) = taxon.own_key() else {
        return Classification::Gap(GapReason::MissingKey);
    };

    if status.is_synonym_family() {
        return Classification::Assigned { bucket: Bucket::Synonym, key: own_key };
    }

    match rank {
        occucube_core::TaxonRank::Species => Classification::Assigned {
            bucket: Bucket::Species,
            key: taxon.species_key.unwrap_or(own_key),
        },
        r if r.is_infraspecific() => Classification::Assigned {
            bucket: Bucket::Infraspecific,
            key: own_key,
        },
        other => Classification::Gap(GapReason::UnsupportedRank(other.as_str().to_string())),
    }
}

/// Key sets of the three buckets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketKeys {
    pub species: BTreeSet<TaxonKey>,
    pub infraspecific: BTreeSet<TaxonKey>,
    pub synonym: BTreeSet<TaxonKey>,
}

impl BucketKeys {
    pub fn get(&self, bucket: Bucket) -> &BTreeSet<TaxonKey> {
        match bucket {
            Bucket::Species => &self.species,
            Bucket::Infraspecific => &self.infraspecific,
            Bucket::Synonym => &self.synonym,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut BTreeSet<TaxonKey> {
        match bucket {
            Bucket::Species => &mut self.species,
            Bucket::Infraspecific => &mut self.infraspecific,
            Bucket::Synonym => &mut self.synonym,
        }
    }

    pub fn len(&self) -> usize {
        self.species.len() + self.infraspecific.len() + self.synonym.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys claimed by more than one bucket, with the buckets involved
    pub fn overlaps(&self) -> Vec<(TaxonKey, Bucket, Bucket)> {
        let mut overlaps = Vec::new();
        for (i, a) in Bucket::ALL.iter().enumerate() {
            for b in &Bucket::ALL[i + 1..] {
                for key in self.get(*a).intersection(self.get(*b)) {
                    overlaps.push((*key, *a, *b));
                }
            }
        }
        overlaps
    }
}

/// Classification of a whole taxa-of-interest list
#[derive(Debug, Clone, Default)]
pub struct ClassifierOutput {
    pub keys: BucketKeys,
    /// (row, bucket, key) for every classified taxon, in input order
    pub assignments: Vec<(usize, Bucket, TaxonKey)>,
    pub gaps: Vec<ClassificationGap>,
}

impl ClassifierOutput {
    pub fn classified(&self) -> usize {
        self.assignments.len()
    }

    pub fn assigned_to(&self, bucket: Bucket) -> usize {
        self.assignments.iter().filter(|(_, b, _)| *b == bucket).count()
    }
}

/// Partition the taxa of interest into the three bucket key sets
pub fn partition(taxa: &[TaxonOfInterest]) -> ClassifierOutput {
    let mut output = ClassifierOutput::default();

    for (row, taxon) in taxa.iter().enumerate() {
        match classify(taxon) {
            Classification::Assigned { bucket, key } => {
                output.keys.get_mut(bucket).insert(key);
                output.assignments.push((row, bucket, key));
            }
            Classification::Gap(reason) => {
                tracing::warn!(
                    "Taxon of interest at row {} ({}) excluded from the cube: {}",
                    row,
                    taxon
                        .scientific_name
                        .as_deref()
                        .map(str::to_string)
                        .or_else(|| taxon.own_key().map(|k| k.to_string()))
                        .unwrap_or_else(|| "unnamed".to_string()),
                    reason
                );
                output.gaps.push(ClassificationGap {
                    row,
                    key: taxon.own_key(),
                    scientific_name: taxon.scientific_name.clone(),
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        "Classified {} of {} taxa: {} species, {} infraspecific, {} synonym keys",
        output.classified(),
        taxa.len(),
        output.keys.species.len(),
        output.keys.infraspecific.len(),
        output.keys.synonym.len()
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use occucube_core::{TaxonRank, TaxonomicStatus};

    fn taxon(key: u64, rank: &str, status: &str) -> TaxonOfInterest {
        TaxonOfInterest::new(TaxonKey(key), rank.parse().unwrap(), status.parse().unwrap())
    }

    #[test]
    fn test_accepted_species_uses_species_key() {
        let t = taxon(1, "SPECIES", "ACCEPTED").with_species_key(TaxonKey(1));
        assert_eq!(
            classify(&t),
            Classification::Assigned { bucket: Bucket::Species, key: TaxonKey(1) }
        );

        let doubtful = taxon(3, "SPECIES", "DOUBTFUL");
        assert_eq!(
            classify(&doubtful),
            Classification::Assigned { bucket: Bucket::Species, key: TaxonKey(3) }
        );
    }

    #[test]
    fn test_infraspecific_ranks() {
        for rank in ["SUBSPECIFICAGGREGATE", "SUBSPECIES", "VARIETY", "SUBVARIETY", "FORM", "SUBFORM"] {
            let t = taxon(7, rank, "ACCEPTED").with_species_key(TaxonKey(2));
            assert_eq!(
                classify(&t),
                Classification::Assigned { bucket: Bucket::Infraspecific, key: TaxonKey(7) },
                "rank {}",
                rank
            );
        }
    }

    #[test]
    fn test_synonyms_regardless_of_rank() {
        for (rank, status) in [("SPECIES", "SYNONYM"), ("GENUS", "HOMOTYPIC_SYNONYM"), ("VARIETY", "MISAPPLIED")] {
            let t = taxon(99, rank, status);
            assert_eq!(
                classify(&t),
                Classification::Assigned { bucket: Bucket::Synonym, key: TaxonKey(99) }
            );
        }
    }

    #[test]
    fn test_accepted_genus_is_a_gap() {
        let t = taxon(10, "GENUS", "ACCEPTED");
        assert_eq!(
            classify(&t),
            Classification::Gap(GapReason::UnsupportedRank("GENUS".to_string()))
        );
    }

    #[test]
    fn test_missing_fields_are_gaps() {
        let mut no_rank = taxon(1, "SPECIES", "ACCEPTED");
        no_rank.rank = None;
        assert_eq!(classify(&no_rank), Classification::Gap(GapReason::MissingRank));

        let mut no_status = taxon(1, "SPECIES", "ACCEPTED");
        no_status.taxonomic_status = None;
        assert_eq!(classify(&no_status), Classification::Gap(GapReason::MissingStatus));

        let no_key = TaxonOfInterest {
            rank: Some(TaxonRank::Species),
            taxonomic_status: Some(TaxonomicStatus::Accepted),
            ..Default::default()
        };
        assert_eq!(classify(&no_key), Classification::Gap(GapReason::MissingKey));
    }

    #[test]
    fn test_partition_is_disjoint_and_records_gaps() {
        let taxa = vec![
            taxon(1, "SPECIES", "ACCEPTED").with_species_key(TaxonKey(1)),
            taxon(7, "SUBSPECIES", "ACCEPTED").with_species_key(TaxonKey(1)),
            taxon(99, "SPECIES", "SYNONYM").with_species_key(TaxonKey(1)),
            taxon(10, "GENUS", "ACCEPTED").with_name("Rana"),
            taxon(1, "SPECIES", "ACCEPTED").with_species_key(TaxonKey(1)),
        ];

        let output = partition(&taxa);

        assert_eq!(output.keys.species, BTreeSet::from([TaxonKey(1)]));
        assert_eq!(output.keys.infraspecific, BTreeSet::from([TaxonKey(7)]));
        assert_eq!(output.keys.synonym, BTreeSet::from([TaxonKey(99)]));
        assert!(output.keys.overlaps().is_empty());
        assert_eq!(output.classified(), 4);
        assert_eq!(output.assigned_to(Bucket::Species), 2);

        assert_eq!(output.gaps.len(), 1);
        assert_eq!(output.gaps[0].row, 3);
        assert_eq!(output.gaps[0].scientific_name.as_deref(), Some("Rana"));
    }

    #[test]
    fn test_overlap_detection() {
        let mut keys = BucketKeys::default();
        keys.species.insert(TaxonKey(5));
        keys.infraspecific.insert(TaxonKey(5));
        keys.synonym.insert(TaxonKey(6));

        assert_eq!(
            keys.overlaps(),
            vec![(TaxonKey(5), Bucket::Species, Bucket::Infraspecific)]
        );
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_grouping_columns() {
        assert_eq!(Bucket::Species.grouping_column(), "speciesKey");
        assert_eq!(Bucket::Infraspecific.grouping_column(), "acceptedTaxonKey");
        assert_eq!(Bucket::Synonym.grouping_column(), "taxonKey");
    }
}
