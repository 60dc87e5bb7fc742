//! Taxonomic side of occucube
//!
//! Holds the taxa-of-interest records, the classifier that partitions them
//! into resolution buckets, and the taxonomy lookup service abstraction with
//! its GBIF, caching and offline implementations.

pub mod classifier;
pub mod lookup;
pub mod record;
pub mod resilience;

// Re-export commonly used types
pub use classifier::{classify, partition, Bucket, BucketKeys, Classification, ClassifierOutput};
pub use lookup::{
    resolve_many, resolve_many_with_progress, CachedLookup, GbifClient, LookupOptions,
    LookupReport, OfflineLookup, TaxonomyLookup,
};
pub use record::{TaxonMetadata, TaxonOfInterest};
pub use resilience::{with_retry_async, RetryPolicy};
