//! Core utilities and types shared across all occucube crates

pub mod config;
pub mod error;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use error::{CubeError, CubeResult};
pub use config::{Config, load_config, save_config};

// Re-export core types
pub use types::{
    TaxonKey, TaxonRank, TaxonomicStatus,
    PipelineSummary, BucketSummary, LookupSummary, ClassificationGap, GapReason,
};

// Re-export system utilities
pub use system::{
    occucube_home,
    default_config_path,
    generate_utc_timestamp,
};

/// Version information for the occucube project
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
