use clap::Parser;
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

mod cli;

use crate::cli::{Cli, Commands};
use occucube_core::CubeError;

fn main() {
    let cli = Cli::parse();

    // OCCUCUBE_LOG wins; otherwise -v / -vv raise the default level
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = std::env::var("OCCUCUBE_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<CubeError>() {
            Some(CubeError::Configuration(_)) => 2,
            Some(CubeError::Io(_)) => 3,
            Some(CubeError::Parse(_)) | Some(CubeError::Csv(_)) | Some(CubeError::MissingColumn(_)) => 4,
            Some(CubeError::InvariantViolation(_)) => 5,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = crate::cli::load_settings(cli.config.as_deref())?;

    // -j beats [performance] threads; 0 in both means all cores
    let requested = if cli.threads > 0 {
        cli.threads
    } else {
        config.performance.threads
    };
    let num_threads = if requested == 0 { num_cpus::get() } else { requested };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    tracing::debug!("Using {} worker threads", num_threads);

    match cli.command {
        Commands::Build(args) => crate::cli::commands::build::run(args, config),
        Commands::Classify(args) => crate::cli::commands::classify::run(args, &config),
        Commands::Lookup(args) => crate::cli::commands::lookup::run(args, config),
    }
}
