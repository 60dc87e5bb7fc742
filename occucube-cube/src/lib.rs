//! Occurrence cube construction
//!
//! Turns a flat occurrence table into one row per (year, cell, taxon) with an
//! occurrence count and the minimum coordinate uncertainty, plus a mapping
//! table listing which raw taxon identifiers were folded into each cube key.

pub mod aggregate;
pub mod formats;
pub mod mapping;
pub mod merge;
pub mod occurrence;
pub mod pipeline;

// Re-export commonly used types
pub use aggregate::{aggregate_bucket, CubeCell, PartialCube};
pub use formats::{Table, TableReader, TableWriter};
pub use mapping::{collect_contributors, BucketMapping, LookupProgress, MappingBuilder, MappingEntry};
pub use merge::{merge_cubes, merge_mappings, Cube, MappingTable, CANONICAL_KEY_COLUMN};
pub use occurrence::{read_occurrences, read_taxa, OccurrenceRecord};
pub use pipeline::{CubeOutput, CubePipeline, OutputFiles, SUMMARY_FILE};
