//! End-to-end tests for the sivacor binary

use assert_cmd::Command;
use predicates::prelude::*;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sivacor::exitcode;

/// Binary with an isolated config location and no inherited settings.
fn sivacor(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sivacor").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("GIRDER_API_KEY")
        .env_remove("GIRDER_API_URL")
        .env_remove("SIVACOR_CONFIG")
        .env_remove("SIVACOR_API_URL")
        .env_remove("SIVACOR_TIMEOUT_SECS")
        .env_remove("SIVACOR_PAGE_SIZE");
    cmd
}

async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

async fn girder() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/api_key/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"authToken": {"token": "t"}})),
        )
        .mount(&server)
        .await;
    server
}

// ============================================================
// Argument handling
// ============================================================

#[test]
fn given_no_arguments_when_running_then_usage_exit() {
    let home = TempDir::new().unwrap();
    sivacor(&home)
        .assert()
        .code(exitcode::USAGE)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn given_help_flag_when_running_then_success() {
    let home = TempDir::new().unwrap();
    sivacor(&home)
        .arg("--help")
        .assert()
        .code(exitcode::OK)
        .stdout(predicate::str::contains("submission"))
        .stdout(predicate::str::contains("user"));
}

#[test]
fn given_unknown_resource_or_action_when_running_then_usage_exit() {
    let home = TempDir::new().unwrap();
    for args in [
        vec!["collection", "list"],
        vec!["user", "delete"],
        vec!["submission", "list", "--sort-dir", "sideways"],
        vec!["submission", "get", "x-1", "--download", "everything"],
    ] {
        sivacor(&home)
            .env("GIRDER_API_KEY", "k")
            .args(&args)
            .assert()
            .code(exitcode::USAGE);
    }
}

// ============================================================
// Configuration
// ============================================================

#[rstest]
#[case::submission_list(&["submission", "list"])]
#[case::submission_get(&["submission", "get", "x-1"])]
#[case::user_list(&["user", "list"])]
#[case::job_list(&["job", "list"])]
#[tokio::test(flavor = "multi_thread")]
async fn given_missing_api_key_when_running_then_config_exit_without_requests(
    #[case] args: &[&str],
) {
    // Arrange
    let server = girder().await;
    let home = TempDir::new().unwrap();
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_URL", format!("{}/api/v1", server.uri()))
        .args(args);

    // Act
    let assert = run(cmd).await;

    // Assert
    assert
        .code(exitcode::CONFIG)
        .stderr(predicate::str::contains("GIRDER_API_KEY"));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "{args:?} sent a request without a key");
}

#[test]
fn given_missing_explicit_config_file_when_running_then_config_exit() {
    let home = TempDir::new().unwrap();
    sivacor(&home)
        .env("GIRDER_API_KEY", "k")
        .args(["--config", "/definitely/not/here.toml", "user", "list"])
        .assert()
        .code(exitcode::CONFIG)
        .stderr(predicate::str::contains("config file not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn given_config_file_api_url_when_running_then_used() {
    // Arrange
    let server = girder().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "u1", "login": "alice", "firstName": "Alice", "lastName": "Liddell"}
        ])))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let config = home.path().join("sivacor.toml");
    std::fs::write(
        &config,
        format!("api_url = \"{}/api/v1\"\npage_size = 10\n", server.uri()),
    )
    .unwrap();
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_KEY", "k")
        .arg("--config")
        .arg(&config)
        .args(["user", "list", "--json"]);

    // Act
    let assert = run(cmd).await;

    // Assert
    assert
        .code(exitcode::OK)
        .stdout(predicate::str::contains("\"login\": \"alice\""));
}

// ============================================================
// Commands against a mock Girder
// ============================================================

#[tokio::test(flavor = "multi_thread")]
async fn given_users_when_listing_then_prints_table() {
    let server = girder().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "u1", "login": "alice", "firstName": "Alice", "lastName": "Liddell",
             "email": "alice@example.org", "oauth": [{"provider": "github"}]}
        ])))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_KEY", "k")
        .env("GIRDER_API_URL", format!("{}/api/v1", server.uri()))
        .args(["user", "list"]);

    run(cmd)
        .await
        .code(exitcode::OK)
        .stdout(predicate::str::contains("Alice Liddell"))
        .stdout(predicate::str::contains("alice@example.org"))
        .stdout(predicate::str::contains("github"));
}

#[tokio::test(flavor = "multi_thread")]
async fn given_unknown_job_when_getting_then_not_found_exit() {
    let server = girder().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/job/nope"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid ObjectId"})))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_KEY", "k")
        .env("GIRDER_API_URL", format!("{}/api/v1", server.uri()))
        .args(["job", "get", "nope"]);

    run(cmd)
        .await
        .code(exitcode::NOINPUT)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("nope"));
}

#[tokio::test(flavor = "multi_thread")]
async fn given_rejected_key_when_running_then_permission_exit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/api_key/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid API key."})))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_KEY", "bad")
        .env("GIRDER_API_URL", format!("{}/api/v1", server.uri()))
        .args(["user", "list"]);

    run(cmd)
        .await
        .code(exitcode::NOPERM)
        .stderr(predicate::str::contains("Invalid API key."));
}

#[tokio::test(flavor = "multi_thread")]
async fn given_submission_with_missing_artifact_when_downloading_then_warns_and_succeeds() {
    // Arrange
    let server = girder().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collection"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"_id": "c1", "name": "Submissions"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "f1",
            "name": "alice-run-1",
            "created": "2025-03-01T10:20:30.000000+00:00",
            "meta": {"status": "completed", "job_id": "j1", "stdout_file_id": "file-out"}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/file/file-out"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "file-out", "name": "stdout.txt"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/file/file-out/download"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello\n".to_vec()))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();
    let out = home.path().join("out");
    let mut cmd = sivacor(&home);
    cmd.env("GIRDER_API_KEY", "k")
        .env("GIRDER_API_URL", format!("{}/api/v1", server.uri()))
        .args(["submission", "get", "alice-run-1", "--download", "tro", "--download", "stdout"])
        .arg("--output-dir")
        .arg(&out);

    // Act
    let assert = run(cmd).await;

    // Assert
    assert
        .code(exitcode::OK)
        .stdout(predicate::str::contains("Status: completed"))
        .stdout(predicate::str::contains("Run output log: file-out"))
        .stderr(predicate::str::contains("TRO Declaration is not available"));
    assert_eq!(std::fs::read(out.join("stdout.txt")).unwrap(), b"hello\n");
}
