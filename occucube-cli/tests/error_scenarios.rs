mod common;

use anyhow::Result;
use occucube_test::{TestEnvironment, TestOccurrence};
use occucube_core::{TaxonKey, TaxonRank, TaxonomicStatus};
use occucube_taxonomy::TaxonOfInterest;
use predicates::prelude::*;

use common::*;

#[test]
fn test_missing_input_file_is_io_error() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;

    occucube_cmd(&env)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(env.root().join("absent.csv"))
        .arg("--offline")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("absent.csv"));
    Ok(())
}

#[test]
fn test_missing_required_column() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;
    let occurrences = env.write_file("input/occ.csv", "year,taxonKey\n2020,1\n")?;

    occucube_cmd(&env)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("--offline")
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("eea_cell_code"));
    Ok(())
}

#[test]
fn test_invalid_config_exits_with_configuration_code() -> Result<()> {
    let env = TestEnvironment::new()?;
    let config = env.write_file("bad.toml", "[lookup]\nmax_concurrency = 0\n")?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;

    occucube_cmd(&env)
        .arg("-c").arg(&config)
        .args(["classify", "--taxa"])
        .arg(&taxa)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("max_concurrency"));
    Ok(())
}

#[test]
fn test_overlapping_buckets_abort_the_build() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[
        species(5, "Rana esculenta"),
        TaxonOfInterest::new(TaxonKey(5), TaxonRank::Variety, TaxonomicStatus::Accepted),
    ])?;
    let occurrences = env.write_occurrences(&[TestOccurrence::new(2020, "E1", 5)])?;

    occucube_cmd(&env)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("-o").arg(env.output_dir())
        .arg("--offline")
        .assert()
        .failure()
        .code(5)
        .stderr(predicate::str::contains("appears in both"));

    assert!(!env.output_dir().join("cube.csv").exists());
    Ok(())
}

#[test]
fn test_lookup_requires_keys() {
    let env = TestEnvironment::new().unwrap();
    occucube_cmd(&env)
        .arg("lookup")
        .assert()
        .failure()
        .code(predicate::ne(101));
}
