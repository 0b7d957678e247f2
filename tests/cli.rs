//! CLI integration tests: drive the binary end to end over real files.

use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PRG: &str = "pbwt";

const MACS: &str = "COMMAND: macs 4 1000 -t 0.001\n\
                    SEED: 12345\n\
                    SITE: 0 0.1 0.0 0011\n\
                    SITE: 1 0.2 0.0 0011\n\
                    SITE: 2 0.55 0.0 0101\n\
                    SITE: 3 0.9 0.0 0011\n";

fn ingest(dir: &TempDir) -> Result<String> {
    let macs = dir.path().join("sim.macs");
    fs::write(&macs, MACS)?;
    let panel = dir.path().join("panel.pbwt");
    Command::cargo_bin(PRG)?
        .args([
            "--macs",
            macs.to_str().unwrap(),
            "--write",
            panel.to_str().unwrap(),
            "--check",
        ])
        .assert()
        .success();
    Ok(panel.to_str().unwrap().to_string())
}

#[test]
fn test_macs_to_haps_and_sites() -> Result<()> {
    let dir = TempDir::new()?;
    let macs = dir.path().join("sim.macs");
    fs::write(&macs, MACS)?;
    let haps = dir.path().join("out.haps");
    let sites = dir.path().join("out.sites");

    Command::cargo_bin(PRG)?
        .args([
            "--macs",
            macs.to_str().unwrap(),
            "--haps",
            haps.to_str().unwrap(),
            "--writeSites",
            sites.to_str().unwrap(),
            "--check",
        ])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&haps)?, "0011\n0011\n0101\n0011\n");
    assert_eq!(fs::read_to_string(&sites)?, "100\n200\n550\n900\n");
    Ok(())
}

#[test]
fn test_write_read_rewrite_identity() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;
    let again = dir.path().join("again.pbwt");

    Command::cargo_bin(PRG)?
        .args(["--read", &panel, "--write", again.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(fs::read(&panel)?, fs::read(again)?);
    Ok(())
}

#[test]
fn test_stats_go_to_stdout() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;

    Command::cargo_bin(PRG)?
        .args(["--read", &panel, "--stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("M 4 N 4"));
    Ok(())
}

#[test]
fn test_long_matches_within() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;

    Command::cargo_bin(PRG)?
        .args(["--read", &panel, "--longWithin", "2", "--check"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("MATCH\t0\t1\t0\t2\t2")
                .and(predicate::str::contains("MATCH\t2\t3\t0\t2\t2")),
        );
    Ok(())
}

#[test]
fn test_maximal_matches_within() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;

    Command::cargo_bin(PRG)?
        .args(["--read", &panel, "--maximalWithin", "--check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MATCH\t"));
    Ok(())
}

#[test]
fn test_query_panel_against_itself() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;

    let mut expected = predicate::str::contains("MATCH-QUERY\t0\t0\t0\t4\t4").boxed();
    for q in 1..4 {
        expected = expected
            .and(predicate::str::contains(format!(
                "MATCH-QUERY\t{q}\t{q}\t0\t4\t4"
            )))
            .boxed();
    }
    Command::cargo_bin(PRG)?
        .args(["--read", &panel, "--test", &panel, "--check"])
        .assert()
        .success()
        .stdout(expected);
    Ok(())
}

#[test]
fn test_subsample_identity_through_cli() -> Result<()> {
    let dir = TempDir::new()?;
    let panel = ingest(&dir)?;
    let sub = dir.path().join("sub.pbwt");

    Command::cargo_bin(PRG)?
        .args([
            "--read",
            &panel,
            "--subsample",
            "0",
            "4",
            "--write",
            sub.to_str().unwrap(),
        ])
        .assert()
        .success();

    assert_eq!(fs::read(&panel)?, fs::read(sub)?);
    Ok(())
}

#[test]
fn test_missing_input_fails() -> Result<()> {
    Command::cargo_bin(PRG)?
        .args(["--read", "/no/such/panel.pbwt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
    Ok(())
}

#[test]
fn test_no_input_fails() -> Result<()> {
    Command::cargo_bin(PRG)?
        .assert()
        .failure()
        .stderr(predicate::str::contains("no input panel"));
    Ok(())
}
