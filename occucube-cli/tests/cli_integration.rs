mod common;

use anyhow::Result;
use occucube_test::assertions::{assert_header, data_lines};
use occucube_test::{TestEnvironment, TestOccurrence};
use predicates::prelude::*;
use pretty_assertions::assert_eq;

use common::*;

#[test]
fn test_cli_help_command() {
    let env = TestEnvironment::new().unwrap();
    occucube_cmd(&env)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("lookup"));
}

#[test]
fn test_cli_version_command() {
    let env = TestEnvironment::new().unwrap();
    occucube_cmd(&env)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("occucube"));
}

#[test]
fn test_build_offline_writes_all_outputs() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo"), synonym(99, "Rana fusca")])?;
    let occurrences = env.write_occurrences(&[
        TestOccurrence::new(2020, "1kmE3900N3100", 1).named("Bufo bufo").uncertainty(30.0),
        TestOccurrence::new(2020, "1kmE3900N3100", 1).named("Bufo bufo").uncertainty(10.0),
        TestOccurrence::new(2021, "1kmE3900N3100", 99).species(3).named("Rana fusca"),
    ])?;

    occucube_cmd(&env)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("-o").arg(env.output_dir())
        .arg("--offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 taxa of interest represented in the cube"));

    let cube = env.read_file("output/cube.csv")?;
    assert_header(&cube, &["year", "eea_cell_code", "taxonKey", "n", "min_coord_uncertainty"]);
    assert_eq!(
        data_lines(&cube),
        vec!["2020,1kmE3900N3100,1,2,10", "2021,1kmE3900N3100,99,1,"]
    );

    let mapping = env.read_file("output/cube_taxa.csv")?;
    assert_eq!(data_lines(&mapping), vec!["1,,,,1: Bufo bufo", "99,,,,99: Rana fusca"]);

    let summary: serde_json::Value = serde_json::from_str(&env.read_file("output/summary.json")?)?;
    assert_eq!(summary["cube_rows"], 2);
    assert_eq!(summary["lookup"]["not_found"], 2);
    Ok(())
}

#[test]
fn test_build_respects_output_flags() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;
    let occurrences = env.write_occurrences(&[TestOccurrence::new(2020, "E1", 1).named("Bufo bufo")])?;

    occucube_cmd(&env)
        .args(["build", "--offline", "--delimiter", "\t"])
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("-o").arg(env.output_dir())
        .assert()
        .success();

    let cube = env.read_file("output/cube.csv")?;
    assert_eq!(data_lines(&cube), vec!["2020\tE1\t1\t1\t"]);
    Ok(())
}

#[test]
fn test_build_reads_config_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    let config = env.write_file(
        "occucube.toml",
        "[lookup]\nenabled = false\n\n[output]\ncube_file = \"my_cube.csv\"\n",
    )?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;
    let occurrences = env.write_occurrences(&[TestOccurrence::new(2020, "E1", 1)])?;

    occucube_cmd(&env)
        .arg("-c").arg(&config)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("-o").arg(env.output_dir())
        .assert()
        .success();

    assert!(env.output_dir().join("my_cube.csv").exists());
    assert!(!env.output_dir().join("cube.csv").exists());
    Ok(())
}

#[test]
fn test_build_reports_excluded_taxa() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo"), genus(10, "Bufo")])?;
    let occurrences = env.write_occurrences(&[
        TestOccurrence::new(2020, "E1", 1),
        TestOccurrence::new(2020, "E1", 10),
    ])?;

    occucube_cmd(&env)
        .arg("build")
        .arg("--taxa").arg(&taxa)
        .arg("--occurrences").arg(&occurrences)
        .arg("-o").arg(env.output_dir())
        .arg("--offline")
        .assert()
        .success()
        .stdout(predicate::str::contains("accepted name at unsupported rank GENUS"))
        .stdout(predicate::str::contains("1 of 2 taxa of interest represented in the cube"));

    let cube = env.read_file("output/cube.csv")?;
    assert_eq!(data_lines(&cube), vec!["2020,E1,1,1,"]);
    Ok(())
}

#[test]
fn test_classify_json() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo"), synonym(99, "Rana fusca"), genus(10, "Bufo")])?;

    let output = occucube_cmd(&env)
        .args(["classify", "--format", "json", "--taxa"])
        .arg(&taxa)
        .output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["species"], serde_json::json!([1]));
    assert_eq!(report["synonym"], serde_json::json!([99]));
    assert_eq!(report["infraspecific"], serde_json::json!([]));
    assert_eq!(report["gaps"][0]["detail"], "GENUS");
    Ok(())
}

#[test]
fn test_classify_text() -> Result<()> {
    let env = TestEnvironment::new()?;
    let taxa = env.write_taxa(&[species(1, "Bufo bufo")])?;

    occucube_cmd(&env)
        .args(["classify", "--taxa"])
        .arg(&taxa)
        .assert()
        .success()
        .stdout(predicate::str::contains("Bufo bufo"))
        .stdout(predicate::str::contains("1 of 1 taxa classified"));
    Ok(())
}
