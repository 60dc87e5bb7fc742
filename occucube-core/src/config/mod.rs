//! Configuration types for occucube

use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::CubeError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Query the taxonomy service at all (false leaves metadata empty)
    #[serde(default = "default_lookup_enabled")]
    pub enabled: bool,
    /// Base URL of the species API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for a single key lookup
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum lookups in flight at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Deadline for the whole mapping phase
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Retries after the first failed attempt of a lookup
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Field delimiter; detected from the file when unset
    #[serde(default)]
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_delimiter")]
    pub delimiter: char,
    /// Separator between entries of the `includes` column
    #[serde(default = "default_includes_separator")]
    pub includes_separator: String,
    #[serde(default = "default_cube_file")]
    pub cube_file: String,
    #[serde(default = "default_taxa_file")]
    pub taxa_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Worker threads for aggregation (0 = all cores)
    #[serde(default)]
    pub threads: usize,
}

// Default value functions
fn default_lookup_enabled() -> bool { true }
fn default_base_url() -> String { "https://api.gbif.org/v1".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_max_concurrency() -> usize { 8 }
fn default_deadline_secs() -> u64 { 600 }
fn default_max_retries() -> u32 { 3 }
fn default_user_agent() -> String { format!("occucube/{}", crate::VERSION) }
fn default_output_delimiter() -> char { ',' }
fn default_includes_separator() -> String { " | ".to_string() }
fn default_cube_file() -> String { "cube.csv".to_string() }
fn default_taxa_file() -> String { "cube_taxa.csv".to_string() }

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            enabled: default_lookup_enabled(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            deadline_secs: default_deadline_secs(),
            max_retries: default_max_retries(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_output_delimiter(),
            includes_separator: default_includes_separator(),
            cube_file: default_cube_file(),
            taxa_file: default_taxa_file(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self { threads: 0 }
    }
}

impl Config {
    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), CubeError> {
        if self.lookup.max_concurrency == 0 {
            return Err(CubeError::Configuration(
                "lookup.max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.lookup.timeout_secs == 0 {
            return Err(CubeError::Configuration(
                "lookup.timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.output.delimiter.is_ascii() {
            return Err(CubeError::Configuration(format!(
                "output.delimiter must be a single ASCII character, got {:?}",
                self.output.delimiter
            )));
        }
        if let Some(d) = self.input.delimiter {
            if !d.is_ascii() {
                return Err(CubeError::Configuration(format!(
                    "input.delimiter must be a single ASCII character, got {:?}",
                    d
                )));
            }
        }
        Ok(())
    }
}

pub fn default_config() -> Config {
    Config::default()
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, CubeError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), CubeError> {
    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
