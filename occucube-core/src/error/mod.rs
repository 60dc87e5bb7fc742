//! Core error types for occucube

use thiserror::Error;

use crate::types::TaxonKey;

/// Main error type for occucube operations
#[derive(Error, Debug)]
pub enum CubeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parsing error: {0}")]
    Parse(String),

    #[error("Delimited text error: {0}")]
    Csv(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Lookup of taxon {key} failed: {message}")]
    Lookup { key: TaxonKey, message: String },

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for occucube operations
pub type CubeResult<T> = Result<T, CubeError>;

impl CubeError {
    /// Whether retrying the same operation may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, CubeError::Network(_) | CubeError::Timeout(_))
    }
}

// Conversion implementations for common error types
impl From<serde_json::Error> for CubeError {
    fn from(err: serde_json::Error) -> Self {
        CubeError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for CubeError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            match err.into_kind() {
                csv::ErrorKind::Io(io) => CubeError::Io(io),
                other => CubeError::Csv(format!("{:?}", other)),
            }
        } else {
            CubeError::Csv(err.to_string())
        }
    }
}

impl From<toml::de::Error> for CubeError {
    fn from(err: toml::de::Error) -> Self {
        CubeError::Configuration(format!("Failed to parse config: {}", err))
    }
}

impl From<toml::ser::Error> for CubeError {
    fn from(err: toml::ser::Error) -> Self {
        CubeError::Configuration(format!("Failed to serialize config: {}", err))
    }
}

impl From<anyhow::Error> for CubeError {
    fn from(err: anyhow::Error) -> Self {
        CubeError::Other(err.to_string())
    }
}
