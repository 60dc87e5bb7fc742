//! Pipeline summary statistics
//!
//! Non-fatal conditions (classification gaps, lookup failures, empty buckets)
//! are reported here instead of being raised as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TaxonKey;

/// Why a taxon of interest was left out of every bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum GapReason {
    MissingRank,
    MissingStatus,
    MissingKey,
    /// ACCEPTED or DOUBTFUL name at a rank that is neither species nor infraspecific
    UnsupportedRank(String),
}

impl fmt::Display for GapReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRank => write!(f, "rank is missing"),
            Self::MissingStatus => write!(f, "taxonomic status is missing"),
            Self::MissingKey => write!(f, "no backboneTaxonKey or key"),
            Self::UnsupportedRank(rank) => write!(f, "accepted name at unsupported rank {}", rank),
        }
    }
}

/// A taxon of interest excluded from the cube
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationGap {
    /// Row position in the taxa-of-interest table (0-based)
    pub row: usize,
    pub key: Option<TaxonKey>,
    pub scientific_name: Option<String>,
    #[serde(flatten)]
    pub reason: GapReason,
}

/// Per-bucket counts
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSummary {
    pub bucket: String,
    /// Distinct bucket keys from the taxa of interest
    pub taxa: usize,
    /// Bucket keys that matched at least one occurrence
    pub taxa_with_occurrences: usize,
    pub occurrences: usize,
    pub cube_rows: usize,
    pub mapping_rows: usize,
    /// Keys replaced by the accepted key returned by the lookup service
    pub remapped_keys: usize,
}

/// Taxonomy lookup outcome counts
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupSummary {
    pub requested: usize,
    pub resolved: usize,
    /// Keys the service answered with no record
    pub not_found: usize,
    /// Keys that failed or were skipped after the deadline
    pub failed: usize,
}

impl LookupSummary {
    pub fn absorb(&mut self, other: &LookupSummary) {
        self.requested += other.requested;
        self.resolved += other.resolved;
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

/// Summary of one pipeline run
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub generated_at: String,
    pub taxa_total: usize,
    pub taxa_classified: usize,
    pub taxa_in_cube: usize,
    pub occurrences_read: usize,
    pub occurrences_used: usize,
    pub cube_rows: usize,
    pub mapping_rows: usize,
    pub buckets: Vec<BucketSummary>,
    pub empty_buckets: Vec<String>,
    pub lookup: LookupSummary,
    pub gaps: Vec<ClassificationGap>,
    pub elapsed_ms: u128,
}

impl PipelineSummary {
    /// Fraction of taxa of interest that ended up in the cube
    pub fn coverage(&self) -> f64 {
        if self.taxa_total == 0 {
            0.0
        } else {
            self.taxa_in_cube as f64 / self.taxa_total as f64
        }
    }

    pub fn coverage_line(&self) -> String {
        format!(
            "{} of {} taxa of interest represented in the cube",
            self.taxa_in_cube, self.taxa_total
        )
    }
}
