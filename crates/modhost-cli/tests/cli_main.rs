//! Basic CLI tests for the modhost command-line host.

use assert_cmd::Command;
use predicates::prelude::*;

/// Test that the CLI binary exists and shows help.
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("--strict"));
}

/// Test that the CLI shows version information.
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("modhost"));
}

/// The startup report is printed when no subcommand is given.
#[test]
fn test_default_is_status() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Search directory:"));
}

/// The JSON report lists one outcome per declared module.
#[test]
fn test_status_json() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    let output = cmd.args(["status", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["outcomes"].is_array());
}

#[test]
fn test_list_json_naming() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    let output = cmd.args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());

    let listing: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(listing["naming"]["prefix"], std::env::consts::DLL_PREFIX);
    assert_eq!(listing["naming"]["suffix"], std::env::consts::DLL_SUFFIX);
    assert!(listing["modules"].is_array());
}

/// A missing module is reported but does not fail the host.
#[test]
fn test_probe_missing_module() {
    let file_name = format!(
        "{}modhost_missing_backend{}",
        std::env::consts::DLL_PREFIX,
        std::env::consts::DLL_SUFFIX
    );

    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.args(["probe", "modhost_missing_backend"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(file_name.as_str()))
        .stdout(predicate::str::contains("failed"))
        .stderr(predicate::str::contains(format!(
            "failed to load library `{}`",
            file_name
        )));
}

#[test]
fn test_probe_strict_fails() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.args(["--strict", "probe", "modhost_missing_backend"]);

    cmd.assert().failure().code(1);
}

#[test]
fn test_probe_rejects_paths() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.args(["probe", "plugins/codec"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid module name"));
}

#[test]
fn test_probe_requires_names() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.arg("probe");

    cmd.assert().failure();
}

/// Nothing failed at startup, so `--strict` keeps a clean exit.
#[test]
fn test_strict_list_succeeds_without_failures() {
    let mut cmd = Command::cargo_bin("modhost").unwrap();
    cmd.args(["--strict", "list"]);

    cmd.assert().success();
}
