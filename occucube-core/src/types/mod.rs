/// Core types shared across all occucube modules
pub mod stats;
pub mod taxon;

// Re-export commonly used types at module level
pub use stats::{BucketSummary, ClassificationGap, GapReason, LookupSummary, PipelineSummary};
pub use taxon::{TaxonKey, TaxonRank, TaxonomicStatus};
