#![allow(dead_code)]

use assert_cmd::Command;
use occucube_core::{TaxonKey, TaxonRank, TaxonomicStatus};
use occucube_taxonomy::TaxonOfInterest;
use occucube_test::TestEnvironment;

/// The binary, isolated from the user's home and config
pub fn occucube_cmd(env: &TestEnvironment) -> Command {
    let mut cmd = Command::cargo_bin("occucube").expect("occucube binary is built");
    cmd.envs(env.env_vars()).env_remove("OCCUCUBE_LOG");
    cmd
}

pub fn species(key: u64, name: &str) -> TaxonOfInterest {
    TaxonOfInterest::new(TaxonKey(key), TaxonRank::Species, TaxonomicStatus::Accepted)
        .with_species_key(TaxonKey(key))
        .with_name(name)
}

pub fn synonym(key: u64, name: &str) -> TaxonOfInterest {
    TaxonOfInterest::new(TaxonKey(key), TaxonRank::Species, TaxonomicStatus::Synonym).with_name(name)
}

pub fn genus(key: u64, name: &str) -> TaxonOfInterest {
    TaxonOfInterest::new(TaxonKey(key), TaxonRank::Other("GENUS".into()), TaxonomicStatus::Accepted)
        .with_name(name)
}
