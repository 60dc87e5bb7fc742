pub mod commands;
pub mod output;
pub mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use occucube_core::{default_config_path, load_config, Config};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "occucube",
    version,
    about = "Build species occurrence cubes from GBIF downloads",
    long_about = "occucube aggregates occurrence records per year, grid cell and taxon, \
                  reconciling the taxa of interest against the GBIF backbone so every \
                  cube row is keyed on one canonical taxon."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Number of threads to use (0 = all available)
    #[arg(short = 'j', long, default_value = "0", global = true)]
    pub threads: usize,

    /// Configuration file (defaults to $OCCUCUBE_HOME/config.toml when present)
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the occurrence cube and its taxon mapping table
    Build(commands::build::BuildArgs),

    /// Show which bucket each taxon of interest falls in
    Classify(commands::classify::ClassifyArgs),

    /// Resolve taxon keys against the configured lookup service
    Lookup(commands::lookup::LookupArgs),
}

/// Load the explicit config file, else the default one if it exists, else defaults
pub fn load_settings(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        tracing::debug!("Using config {}", default_path.display());
        return load_config(&default_path)
            .with_context(|| format!("Failed to load config from {}", default_path.display()));
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_build_flags() {
        let cli = Cli::parse_from([
            "occucube",
            "-vv",
            "build",
            "--occurrences",
            "occ.csv",
            "--taxa",
            "taxa.csv",
            "--offline",
            "--includes-separator",
            "; ",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build(args) => {
                assert!(args.offline);
                assert_eq!(args.includes_separator.as_deref(), Some("; "));
                assert_eq!(args.output, PathBuf::from("."));
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("absent.toml"));
    }
}
