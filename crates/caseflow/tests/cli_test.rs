//! Integration tests for the `caseflow` CLI binary.
//!
//! Argument parsing, help output, shell completions, share links, and
//! error handling run without any server. The end-to-end tests at the
//! bottom drive the binary against a wiremock instance speaking the
//! platform's REST dialect.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `caseflow` binary with env isolation.
///
/// Clears all `CASEFLOW_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn caseflow_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("caseflow");
    cmd.env("HOME", "/tmp/caseflow-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/caseflow-cli-test-nonexistent")
        .env_remove("CASEFLOW_PROFILE")
        .env_remove("CASEFLOW_SERVER")
        .env_remove("CASEFLOW_BUSINESS_AREA")
        .env_remove("CASEFLOW_PROGRAM")
        .env_remove("CASEFLOW_TOKEN")
        .env_remove("CASEFLOW_OUTPUT")
        .env_remove("CASEFLOW_INSECURE")
        .env_remove("CASEFLOW_TIMEOUT");
    cmd
}

/// `caseflow_cmd` pre-wired to a server with flags-only configuration.
fn connected_cmd(server: &str) -> assert_cmd::Command {
    let mut cmd = caseflow_cmd();
    cmd.args([
        "--server",
        server,
        "--business-area",
        "kenya",
        "--token",
        "test-token",
    ]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = caseflow_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(
        text.contains("Usage"),
        "Expected 'Usage' in output:\n{text}"
    );
}

#[test]
fn test_help_flag() {
    caseflow_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("case-management")
            .and(predicate::str::contains("households"))
            .and(predicate::str::contains("individuals"))
            .and(predicate::str::contains("grievances"))
            .and(predicate::str::contains("payments")),
    );
}

#[test]
fn test_version_flag() {
    caseflow_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("caseflow"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    caseflow_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    caseflow_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    caseflow_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = caseflow_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_grievances_list_no_config() {
    unconfigured_failure(&["grievances", "list"]);
}

fn unconfigured_failure(args: &[&str]) {
    caseflow_cmd().args(args).assert().failure().stderr(
        predicate::str::contains("config")
            .or(predicate::str::contains("Configuration"))
            .or(predicate::str::contains("server"))
            .or(predicate::str::contains("profile")),
    );
}

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    caseflow_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_prints_location() {
    caseflow_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caseflow"));
}

#[test]
fn test_invalid_output_format() {
    let output = caseflow_cmd()
        .args(["--output", "invalid", "grievances", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly — the failure should be about
    // missing server config, not about argument parsing.
    unconfigured_failure(&[
        "--output",
        "json",
        "--verbose",
        "--insecure",
        "--timeout",
        "60",
        "grievances",
        "list",
    ]);
}

#[test]
fn test_malformed_date_flag_is_a_usage_error() {
    connected_cmd("http://127.0.0.1:9")
        .args(["grievances", "list", "--created-from", "2024-13-99"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("YYYY-MM-DD"));
}

#[test]
fn test_program_scoped_list_requires_program() {
    // Fails before any connection attempt: 127.0.0.1:9 would refuse,
    // which would exit 7 instead of the 2 asserted here.
    connected_cmd("http://127.0.0.1:9")
        .args(["households", "list"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("program"));
}

#[test]
fn test_program_scoped_get_requires_program() {
    connected_cmd("http://127.0.0.1:9")
        .args(["payments", "get", "some-id"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("program"));
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_households_subcommands_exist() {
    caseflow_cmd()
        .args(["households", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("get")));
}

#[test]
fn test_grievances_subcommands_exist() {
    caseflow_cmd()
        .args(["grievances", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("get")));
}

#[test]
fn test_grievances_list_flags_exist() {
    caseflow_cmd()
        .args(["grievances", "list", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--status")
                .and(predicate::str::contains("--category"))
                .and(predicate::str::contains("--priority-min"))
                .and(predicate::str::contains("--created-from"))
                .and(predicate::str::contains("--link")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    caseflow_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("path"))
                .and(predicate::str::contains("set-token"))
                .and(predicate::str::contains("erase-token")),
        );
}

// ── Share links (no network) ────────────────────────────────────────

#[test]
fn test_link_renders_without_connecting() {
    // 127.0.0.1:9 would refuse a connection; --link must never try.
    connected_cmd("http://127.0.0.1:9")
        .args([
            "grievances",
            "list",
            "--search",
            "asha",
            "--status",
            "NEW,ASSIGNED",
            "--page",
            "2",
            "--link",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("/kenya/programs/all/grievance/tickets?")
                .and(predicate::str::contains("search=asha"))
                .and(predicate::str::contains("status=NEW"))
                .and(predicate::str::contains("page=2")),
        );
}

#[test]
fn test_link_of_default_filter_is_bare() {
    connected_cmd("http://127.0.0.1:9")
        .args(["--program", "cash", "payments", "list", "--link"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "http://127.0.0.1:9/kenya/programs/cash/payment-module/payment-plans\n",
        ));
}

#[test]
fn test_link_without_program_falls_back_to_all() {
    // Program-scoped registries refuse to *fetch* without a program,
    // but a share link still renders — the web app has an all-programs
    // population view.
    connected_cmd("http://127.0.0.1:9")
        .args(["households", "list", "--search", "asha", "--link"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "/kenya/programs/all/population/household?search=asha",
        ));
}

// ── End-to-end against a mock server ────────────────────────────────
//
// assert_cmd blocks the thread while the child runs, so these need the
// multi-thread runtime to keep wiremock serving in the background.

async fn mount_server_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/rest/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": "1.4.2",
            "environment": "test",
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_grievances_list_end_to_end() {
    let server = MockServer::start().await;
    mount_server_info(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/rest/business-areas/kenya/grievance-tickets/"))
        .and(query_param("search", "asha"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{
                "id": "11111111-1111-1111-1111-111111111111",
                "code": "GRV-0001",
                "status": "IN_PROGRESS",
                "category": "REFERRAL",
                "priority": 2,
                "assignedTo": "Amina Hassan",
                "createdAt": "2024-03-01T08:30:00Z",
            }],
        })))
        .mount(&server)
        .await;

    connected_cmd(&server.uri())
        .args(["--output", "plain", "grievances", "list", "--search", "asha"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "11111111-1111-1111-1111-111111111111",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_flag_walks_every_page() {
    let server = MockServer::start().await;
    mount_server_info(&server).await;

    let ticket = |n: u8, code: &str| {
        json!({
            "id": format!("22222222-2222-2222-2222-22222222222{n}"),
            "code": code,
            "status": "NEW",
        })
    };
    Mock::given(method("GET"))
        .and(path("/api/rest/business-areas/kenya/grievance-tickets/"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": "?page=2",
            "previous": null,
            "results": [ticket(1, "GRV-0001"), ticket(2, "GRV-0002")],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/rest/business-areas/kenya/grievance-tickets/"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": null,
            "previous": "?page=1",
            "results": [ticket(3, "GRV-0003")],
        })))
        .mount(&server)
        .await;

    connected_cmd(&server.uri())
        .args([
            "--output",
            "plain",
            "grievances",
            "list",
            "--page-size",
            "2",
            "--all",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("22222222-2222-2222-2222-222222222221")
                .and(predicate::str::contains(
                    "22222222-2222-2222-2222-222222222222",
                ))
                .and(predicate::str::contains(
                    "22222222-2222-2222-2222-222222222223",
                )),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_unknown_ticket_exits_not_found() {
    let server = MockServer::start().await;
    mount_server_info(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/api/rest/business-areas/kenya/grievance-tickets/00000000-0000-0000-0000-00000000dead/",
        ))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})),
        )
        .mount(&server)
        .await;

    connected_cmd(&server.uri())
        .args(["grievances", "get", "00000000-0000-0000-0000-00000000dead"])
        .assert()
        .failure()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_exits_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rest/info/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token."})),
        )
        .mount(&server)
        .await;

    connected_cmd(&server.uri())
        .args(["grievances", "list"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("token"));
}
