//! CLI integration tests for the Lyceum command-line interface.
//!
//! These tests verify:
//! - Help text and argument parsing
//! - Context management against a throwaway config directory
//! - Login, transparent refresh and the expiry notice against a mock backend
//!
//! Every test points `LYCEUM_CONFIG_DIR` at its own temp directory so the
//! user's real config and sessions are never touched.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Get a command for the lyceum binary, isolated in `config_dir`.
fn lyceum(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("lyceum").unwrap();
    cmd.env("LYCEUM_CONFIG_DIR", config_dir.path())
        .env_remove("LYCEUM_BASE_URL")
        .env_remove("LYCEUM_CONTEXT")
        .env_remove("LYCEUM_PASSWORD");
    cmd
}

/// Run a prepared command off the async runtime.
async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Lyceum"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lyceum"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("leaders"))
        .stdout(predicate::str::contains("events"))
        .stdout(predicate::str::contains("gallery"))
        .stdout(predicate::str::contains("announcements"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_session_subcommands_listed() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["session", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("refresh"))
        .stdout(predicate::str::contains("countdown"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Global Flag Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args([
            "--verbose",
            "--json",
            "--base-url",
            "http://localhost:9999",
            "--context",
            "staging",
            "--help",
        ])
        .assert()
        .success();
}

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .arg("nonexistent")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_event_end_before_start_rejected() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args([
            "--base-url",
            "http://127.0.0.1:9",
            "events",
            "add",
            "Gala",
            "--starts-at",
            "2026-09-20T18:00:00Z",
            "--ends-at",
            "2026-09-20T17:00:00Z",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ends-at is before --starts-at"));
}

#[test]
fn test_bad_timestamp_rejected() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["events", "add", "Gala", "--starts-at", "next friday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--starts-at"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Context Commands
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_first_context_becomes_current() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args([
            "config",
            "set-context",
            "local",
            "--base-url",
            "http://localhost:5000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Context \"local\" created."))
        .stdout(predicate::str::contains("set as current context"));

    lyceum(&dir)
        .args(["config", "current-context"])
        .assert()
        .success()
        .stdout("local\n");

    assert!(dir.path().join("client.yaml").exists());
}

#[test]
fn test_get_and_use_contexts() {
    let dir = TempDir::new().unwrap();
    for (name, url) in [
        ("local", "http://localhost:5000"),
        ("prod", "https://api.example.org"),
    ] {
        lyceum(&dir)
            .args(["config", "set-context", name, "--base-url", url])
            .assert()
            .success();
    }

    lyceum(&dir)
        .args(["config", "use-context", "prod"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Switched to context \"prod\"."));

    lyceum(&dir)
        .args(["config", "get-contexts"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local"))
        .stdout(predicate::str::is_match(r"\*\s+prod\s+https://api.example.org").unwrap());
}

#[test]
fn test_use_unknown_context_fails() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["config", "use-context", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("context 'nowhere' not found"));
}

#[test]
fn test_set_context_requires_valid_url() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["config", "set-context", "local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--base-url is required"));

    lyceum(&dir)
        .args(["config", "set-context", "local", "--base-url", "ftp://x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be http or https"));
}

#[test]
fn test_delete_context() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["config", "set-context", "local", "--base-url", "http://x.test"])
        .assert()
        .success();

    lyceum(&dir)
        .args(["config", "delete-context", "local"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Context \"local\" deleted."))
        .stdout(predicate::str::contains("No current context"));
}

#[test]
fn test_config_show_resolves_session_file() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["config", "set-context", "local", "--base-url", "http://x.test"])
        .assert()
        .success();

    let expected = dir.path().join("sessions").join("local.json");
    lyceum(&dir)
        .args(["--json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"context\": \"local\""))
        .stdout(predicate::str::contains(expected.display().to_string()));
}

#[test]
fn test_missing_base_url_error() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["leaders", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no base URL for context 'default'"));
}

#[test]
fn test_whoami_when_logged_out() {
    let dir = TempDir::new().unwrap();
    lyceum(&dir)
        .args(["--base-url", "http://x.test", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in to default."));
}

// ─────────────────────────────────────────────────────────────────────────────
// Against a Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

async fn login(dir: &TempDir, server: &MockServer, token: &str, refresh: &str) {
    Mock::given(method("POST"))
        .and(path("/api/user/login"))
        .and(body_json(json!({"email": "ada@example.org", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": token,
            "refresh_token": refresh,
            "user": {"name": "Ada", "email": "ada@example.org"}
        })))
        .expect(1)
        .mount(server)
        .await;

    let mut cmd = lyceum(dir);
    cmd.args([
        "--base-url",
        &server.uri(),
        "login",
        "ada@example.org",
        "--password",
        "pw",
    ]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Logged in to default as Ada"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    login(&dir, &server, "t1", "r1").await;

    assert!(dir.path().join("sessions").join("default.json").exists());

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "whoami"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Ada"))
        .stdout(predicate::str::contains("ada@example.org"));

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "logout"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Logged out of default"));

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "whoami"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_expired_token_refreshed_transparently() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    login(&dir, &server, "stale", "r1").await;

    Mock::given(method("GET"))
        .and(path("/api/leaders"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refresh_token": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leaders"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "l2", "name": "Grace", "position": "Treasurer", "order": 2},
            {"id": "l1", "name": "Ada", "position": "President", "order": 1}
        ])))
        .mount(&server)
        .await;

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "leaders", "list"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::is_match(r"(?s)President.*Treasurer").unwrap())
        .stderr(predicate::str::contains("session has expired").not());

    // The refreshed token was written back for the next run
    let stored = std::fs::read_to_string(dir.path().join("sessions").join("default.json")).unwrap();
    assert!(stored.contains("fresh"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_refresh_prints_expiry_notice() {
    let dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    login(&dir, &server, "stale", "r1").await;

    Mock::given(method("GET"))
        .and(path("/api/leaders"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "leaders", "list"]);
    run_blocking(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("revoked"))
        .stderr(predicate::str::contains("Your session has expired").count(1));

    let mut cmd = lyceum(&dir);
    cmd.args(["--base-url", &server.uri(), "whoami"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}
