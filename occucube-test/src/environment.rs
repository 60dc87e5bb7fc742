//! Test environment management
//!
//! Provides an isolated directory for input tables and pipeline outputs,
//! removed on drop.

use anyhow::{Context, Result};
use occucube_taxonomy::TaxonOfInterest;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures::{occurrences_csv, taxa_csv, TestOccurrence};

/// Isolated test environment with automatic cleanup
pub struct TestEnvironment {
    temp_dir: Option<TempDir>,
    root_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("occucube-test")
            .context("Failed to create temporary directory")?;
        let root_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(root_path.join("input"))?;
        std::fs::create_dir_all(root_path.join("home"))?;

        Ok(Self {
            temp_dir: Some(temp_dir),
            root_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Directory pipeline outputs are written to (created on demand)
    pub fn output_dir(&self) -> PathBuf {
        self.root_path.join("output")
    }

    /// Directory to use as `OCCUCUBE_HOME` for spawned binaries
    pub fn home_dir(&self) -> PathBuf {
        self.root_path.join("home")
    }

    /// Environment variables isolating a spawned binary from the user's setup
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let home = self.home_dir();
        vec![
            ("OCCUCUBE_HOME", home.to_string_lossy().to_string()),
        ]
    }

    /// Write a file relative to the environment root, returning its path
    pub fn write_file(&self, path: impl AsRef<Path>, content: &str) -> Result<PathBuf> {
        let full_path = self.root_path.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&full_path, content)
            .with_context(|| format!("Failed to write {}", full_path.display()))?;
        Ok(full_path)
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let full_path = self.root_path.join(path);
        std::fs::read_to_string(&full_path)
            .with_context(|| format!("Failed to read {}", full_path.display()))
    }

    pub fn write_taxa(&self, taxa: &[TaxonOfInterest]) -> Result<PathBuf> {
        self.write_file("input/taxa.csv", &taxa_csv(taxa))
    }

    pub fn write_occurrences(&self, rows: &[TestOccurrence]) -> Result<PathBuf> {
        self.write_file("input/occurrences.csv", &occurrences_csv(rows))
    }

    /// Keep the directory after the test (for debugging)
    pub fn preserve(&mut self) {
        if let Some(temp_dir) = self.temp_dir.take() {
            let path = temp_dir.keep();
            println!("Test environment preserved at: {}", path.display());
        }
    }
}
