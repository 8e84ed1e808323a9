//! Integration tests for the `ridebook` CLI binary.
//!
//! Argument parsing, help output, completions and error handling run
//! without a server; the rest talk to a wiremock backend.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `ridebook` binary with env isolation.
///
/// Clears all `RIDEBOOK_*` env vars and points config directories at
/// `home` so tests never touch the user's real configuration.
fn ridebook_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ridebook");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RIDEBOOK_PROFILE")
        .env_remove("RIDEBOOK_API_URL")
        .env_remove("RIDEBOOK_TOKEN")
        .env_remove("RIDEBOOK_OUTPUT")
        .env_remove("RIDEBOOK_INSECURE")
        .env_remove("RIDEBOOK_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a default profile pointing at `api_url`, keeping tokens in a
/// file so nothing reaches the OS keyring.
fn configure(home: &Path, api_url: &str) {
    ridebook_cmd(home)
        .args(["config", "set", "api_url", api_url])
        .assert()
        .success();
    ridebook_cmd(home)
        .args(["config", "set", "token_storage", "file"])
        .assert()
        .success();
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(home: &Path, args: &[&str]) -> std::process::Output {
    let mut cmd = ridebook_cmd(home);
    cmd.args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = ridebook_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_resources() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("affiliates")
            .and(predicate::str::contains("payouts"))
            .and(predicate::str::contains("requests"))
            .and(predicate::str::contains("dashboard")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ridebook"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_list_without_config_explains_setup() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path())
        .args(["affiliates", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_path_and_show() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    configure(home.path(), "https://api.ridebook.test");
    ridebook_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("api_url = \"https://api.ridebook.test\"")
                .and(predicate::str::contains("token_storage = \"file\"")),
        );
}

#[test]
fn test_unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    ridebook_cmd(home.path())
        .args(["-p", "staging", "dashboard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_sends_filters_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/affiliates"))
        .and(query_param("status", "pending"))
        .and(query_param("limit", "5"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "a1", "name": "Ana", "email": "ana@example.com", "status": "pending",
                  "commissionRate": "10.5", "totalEarnings": "120.00", "totalBookings": "3" }
            ],
            "total": 1, "page": 1, "limit": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    configure(home.path(), &server.uri());

    let output = run(
        home.path(),
        &[
            "--token", "secret-token", "-o", "json",
            "affiliates", "list", "--status", "pending", "--limit", "5",
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], "a1");
    assert_eq!(page["items"][0]["commissionRate"], 10.5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Token expired" })),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    configure(home.path(), &server.uri());

    let output = run(home.path(), &["--token", "stale", "dashboard"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Login required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_export_writes_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/affiliates/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": "id,name\na1,Ana\n",
            "filename": "affiliates.csv",
            "totalRecords": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    configure(home.path(), &server.uri());
    let out_dir = tempfile::tempdir().unwrap();

    let output = run(
        home.path(),
        &[
            "--token", "t", "affiliates", "export",
            "--dir", out_dir.path().to_str().unwrap(),
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let written = std::fs::read_to_string(out_dir.path().join("affiliates.csv")).unwrap();
    assert_eq!(written, "id,name\na1,Ana\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_undeclared_operations_send_nothing() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    configure(home.path(), &server.uri());

    let export = run(home.path(), &["--token", "t", "routes", "export"]).await;
    assert_eq!(export.status.code(), Some(5), "{}", combined_output(&export));

    let act = run(home.path(), &["--token", "t", "-y", "payouts", "act", "publish", "p1"]).await;
    assert_eq!(act.status.code(), Some(2), "{}", combined_output(&act));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_action_reports_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payouts/p1/process"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "message": "Payout already processed" })),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    configure(home.path(), &server.uri());

    let output = run(
        home.path(),
        &["--token", "t", "payouts", "act", "process-payment", "p1"],
    )
    .await;
    assert_eq!(output.status.code(), Some(1));
    assert!(combined_output(&output).contains("Payout already processed"));
}
