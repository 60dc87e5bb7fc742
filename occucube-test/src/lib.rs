//! Test utilities for the occucube workspace
//!
//! Common helpers shared by the integration tests of every crate:
//!
//! - **Test Environment**: temporary directory holding input tables and outputs
//! - **Fixtures**: builders for taxa-of-interest and occurrence rows, CSV writers
//! - **Mock Implementations**: a scriptable taxonomy lookup
//! - **Assertions**: checks on written cube and mapping files

pub mod assertions;
pub mod environment;
pub mod fixtures;
pub mod mock;

// Re-export commonly used items
pub use environment::TestEnvironment;
pub use fixtures::{generate_occurrences, occurrences_csv, taxa_csv, TestOccurrence};
pub use mock::MockTaxonomyLookup;

// Re-export test dependencies for convenience
pub use anyhow::{Context, Result};
pub use tempfile;

/// Initialize test logging (call once per test module)
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("OCCUCUBE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Run a test with a clean environment
///
/// # Example
/// ```rust
/// use occucube_test::with_test_env;
///
/// with_test_env(|env| {
///     let taxa = env.write_file("taxa.csv", "key,rank,taxonomicStatus\n")?;
///     assert!(taxa.exists());
///     Ok(())
/// })
/// .unwrap();
/// ```
pub fn with_test_env<F, R>(f: F) -> Result<R>
where
    F: FnOnce(&TestEnvironment) -> Result<R>,
{
    let env = TestEnvironment::new()?;
    f(&env)
}
