//! CLI tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_info_prints_version_and_tool_status() {
    Command::cargo_bin("vid2gif")
        .unwrap()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stdout(predicate::str::contains("Conversion tool:"));
}

#[test]
fn test_serve_help_lists_flags() {
    Command::cargo_bin("vid2gif")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--scratch-dir"));
}

#[test]
fn test_unknown_subcommand_fails() {
    Command::cargo_bin("vid2gif")
        .unwrap()
        .arg("frobnicate")
        .assert()
        .failure();
}

#[test]
fn test_serve_with_unreadable_config_fails() {
    Command::cargo_bin("vid2gif")
        .unwrap()
        .args(["serve", "--config", "/nonexistent/vid2gif.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}
