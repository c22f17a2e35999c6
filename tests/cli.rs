//! Integration tests for CLI commands

#![allow(deprecated)]

mod common;

use assert_cmd::{assert::OutputAssertExt, cargo::CommandCargoExt};
use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

use common::{Backend, PASSWORD, TOKEN};
use fulcrum_dash::storage::LocalStore;

/// `fulcrum` with config and local storage isolated in `home`
fn fulcrum(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fulcrum").unwrap();
    cmd.env("FULCRUM_CONFIG", home.path().join("config.toml"))
        .env("FULCRUM_DATA_DIR", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("FULCRUM_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn stored_token(home: &TempDir) -> Option<String> {
    LocalStore::open(home.path().join("data").join("local_storage.json"))
        .unwrap()
        .token()
        .map(str::to_string)
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    fulcrum(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_config_path_honors_env() {
    let home = TempDir::new().unwrap();
    let expected = home.path().join("config.toml");
    fulcrum(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy().to_string()));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let home = TempDir::new().unwrap();
    fulcrum(&home).args(["config", "init"]).assert().success();
    assert!(home.path().join("config.toml").exists());

    fulcrum(&home)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    fulcrum(&home)
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_uses_url_override() {
    let home = TempDir::new().unwrap();
    fulcrum(&home)
        .env("FULCRUM_URL", "http://fulcrum.internal:9000")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://fulcrum.internal:9000"));
}

#[test]
fn test_overview_without_token_fails() {
    let home = TempDir::new().unwrap();
    fulcrum(&home)
        .arg("overview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_logout_without_session_succeeds() {
    let home = TempDir::new().unwrap();
    fulcrum(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));
}

#[test]
fn test_login_stores_token_and_logout_clears_it() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(common::spawn(Backend::new()));
    let home = TempDir::new().unwrap();

    fulcrum(&home)
        .env("FULCRUM_URL", &server.url)
        .args(["login", "pm@example.com", "--password", PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed in as pm@example.com"));
    assert_eq!(stored_token(&home).as_deref(), Some(TOKEN));

    fulcrum(&home)
        .env("FULCRUM_URL", &server.url)
        .arg("overview")
        .assert()
        .success()
        .stdout(predicate::str::contains("Projects:"));

    fulcrum(&home).arg("logout").assert().success();
    assert_eq!(stored_token(&home), None);
}

#[test]
fn test_login_with_wrong_password_shows_server_detail() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(common::spawn(Backend::new()));
    let home = TempDir::new().unwrap();

    fulcrum(&home)
        .env("FULCRUM_URL", &server.url)
        .args(["login", "pm@example.com", "--password", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Incorrect email or password"));
}
