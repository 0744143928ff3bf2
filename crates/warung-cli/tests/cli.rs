//! Binary smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("warung")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("pricing"));
}

#[test]
fn config_path_prints_a_location() {
    Command::cargo_bin("warung")
        .unwrap()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}

#[test]
fn config_init_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    Command::cargo_bin("warung")
        .unwrap()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("profit_rate"));
}

#[test]
fn scan_requires_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let receipt = dir.path().join("nota.jpg");
    std::fs::write(&receipt, b"fake image").unwrap();

    // Point at an empty config so validation fails before any network call.
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{}").unwrap();

    Command::cargo_bin("warung")
        .unwrap()
        .env_remove("KOLOSAL_API_KEY")
        .env_remove("KOLOSAL_BASE_URL")
        .args(["scan", "--config"])
        .arg(&config)
        .arg(&receipt)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}
