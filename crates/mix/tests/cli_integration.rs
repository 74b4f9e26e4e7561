//! End-to-end checks of the `mix` binary's argument handling.
//!
//! No server is needed. Config and logs go to a temporary `MIX_CONFIG_DIR`,
//! and the tests that reach the network target a closed local port so only
//! the failure path is exercised.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A closed port on localhost.
const DEAD_SERVER: &str = "http://127.0.0.1:9";

/// The `mix` binary, with config and logs confined to `dir`.
fn mix(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mix").unwrap();
    cmd.env("MIX_CONFIG_DIR", dir.path())
        .env_remove("MIX_SERVER_URL");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and version
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mix"))
        .stdout(predicate::str::contains("walkthroughs"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mix"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("basic"))
        .stdout(predicate::str::contains("sessions"))
        .stdout(predicate::str::contains("messages"))
        .stdout(predicate::str::contains("files"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("preferences"))
        .stdout(predicate::str::contains("permissions"))
        .stdout(predicate::str::contains("system"))
        .stdout(predicate::str::contains("tools"))
        .stdout(predicate::str::contains("stream"));
}

#[test]
fn test_no_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    mix(&dir).assert().failure();
}

// ─────────────────────────────────────────────────────────────────────────────
// Global flags and config
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args([
            "--verbose",
            "--json",
            "--server",
            "http://localhost:9999",
            "--context",
            "mycontext",
            "--help",
        ])
        .assert()
        .success();
}

#[test]
fn test_unknown_context_fails() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["--context", "nope", "system"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context 'nope' not found"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("client.yaml"), "contexts: [unterminated").unwrap();
    mix(&dir)
        .arg("system")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load client config"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand help
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_stream_help() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["stream", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--simple"))
        .stdout(predicate::str::contains("--last-event-id"))
        .stdout(predicate::str::contains("--grace-ms"));
}

#[test]
fn test_files_help() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["files", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--image"));
}

#[test]
fn test_permissions_help() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["permissions", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--grant"))
        .stdout(predicate::str::contains("--deny"))
        .stdout(predicate::str::contains("--auto"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Rejected arguments
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_grant_and_deny_conflict() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["permissions", "--grant", "a", "--deny", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_invalid_auto_decision() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["permissions", "--auto", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_non_numeric_timeout_rejected() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["stream", "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Unreachable server
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_system_unreachable_server_fails() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["--server", DEAD_SERVER, "system"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_server_env_var_is_used() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .env("MIX_SERVER_URL", DEAD_SERVER)
        .arg("basic")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_invalid_server_url_fails() {
    let dir = TempDir::new().unwrap();
    mix(&dir)
        .args(["--server", "not a url", "system"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server URL"));
}
