mod common;

use common::{sfs, StubServer, PROJECT};
use predicates::prelude::*;
use serde_json::Value;

const SHARE_A: &str = r#"{"share": {"id": "a", "name": "alpha", "status": "available"}}"#;
const SHARE_C: &str = r#"{"share": {"id": "c", "name": "gamma", "status": "available"}}"#;
const NOT_FOUND: &str = r#"{"itemNotFound": {"code": 404, "message": "Share could not be found."}}"#;

fn shares_path(rest: &str) -> String {
    format!("/v2/{}/shares{}", PROJECT, rest)
}

#[test]
fn test_grouped_help() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .arg("help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Share Commands:"))
        .stdout(predicate::str::contains("Resource Lock Commands:"))
        .stdout(predicate::str::contains("[experimental]"))
        .stdout(predicate::str::contains("COMPLETE=bash sfs"));
}

#[test]
fn test_subcommand_help_without_required_args() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .args(["lock-show", "-h"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("API versions: 2.81.."));
}

#[test]
fn test_missing_token_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .args(["--endpoint", "http://127.0.0.1:1/v2/p", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with(
            "ERROR: You must provide a token via --os-token or OS_TOKEN",
        ));
}

#[test]
fn test_missing_endpoint_is_an_error() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .args(["--os-token", "t", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("You must provide an endpoint URL"));
}

#[test]
fn test_list_renders_table() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(
        200,
        r#"{"shares": [{"id": "s1", "name": "web", "size": 1, "share_proto": "NFS", "status": "available"}]}"#,
    )]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "secret"])
        .args(["--api-version", "2.65", "list", "--status", "available"])
        .assert()
        .success()
        .stdout(predicate::str::contains("| ID "))
        .stdout(predicate::str::contains("| s1 "))
        .stdout(predicate::str::contains("web"));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, shares_path("/detail?status=available"));
    assert_eq!(
        requests[0].header("X-OpenStack-Manila-API-Version"),
        Some("2.65")
    );
    assert_eq!(requests[0].header("X-Auth-Token"), Some("secret"));
}

#[test]
fn test_show_as_json() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(200, SHARE_A)]);

    let output = sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .args(["--api-version", "2.40", "--format", "json", "show", "a"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["id"], "a");
    assert_eq!(shown["name"], "alpha");
}

#[test]
fn test_batch_delete_reports_aggregate_failure() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![
        (200, SHARE_A),
        (202, ""),
        (404, NOT_FOUND),
        (200, r#"{"shares": []}"#),
        (200, SHARE_C),
        (202, ""),
    ]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .args(["--api-version", "2.40", "delete", "a", "b", "c"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(
            "Request to delete share a has been accepted.",
        ))
        .stdout(predicate::str::contains(
            "Failed to delete share b: No share with a name or ID of 'b' exists.",
        ))
        .stdout(predicate::str::contains(
            "Request to delete share c has been accepted.",
        ))
        .stderr(predicate::str::contains(
            "ERROR: 1 of 3 shares failed to delete.",
        ));

    let requests = server.requests();
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, shares_path("/a"));
    assert_eq!(requests[3].path, shares_path("/detail?name=b"));
    assert_eq!(requests[5].method, "DELETE");
    assert_eq!(requests[5].path, shares_path("/c"));
}

#[test]
fn test_batch_delete_succeeds_when_nothing_fails() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(200, SHARE_A), (202, "")]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .args(["--api-version", "2.40", "delete", "a"])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_unsupported_version_sends_nothing() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .args(["--api-version", "2.50"])
        .args(["share-server-migration-start", "srv-1", "host@backend"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Operation 'share_servers.migration_start' is not supported at API version 2.50",
        ));

    assert!(server.requests().is_empty());
}

#[test]
fn test_latest_version_is_negotiated() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![
        (
            300,
            r#"{"versions": [
                {"id": "v1.0", "status": "DEPRECATED", "min_version": "", "version": ""},
                {"id": "v2.0", "status": "CURRENT", "min_version": "2.0", "version": "2.65"}
            ]}"#,
        ),
        (200, r#"{"availability_zones": [{"id": "az-1", "name": "nova"}]}"#),
    ]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .arg("availability-zone-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("nova"));

    let requests = server.requests();
    assert_eq!(requests[0].path, "/");
    assert_eq!(requests[1].path, format!("/v2/{}/availability-zones", PROJECT));
    assert_eq!(
        requests[1].header("X-OpenStack-Manila-API-Version"),
        Some("2.65")
    );
}

#[test]
fn test_service_fault_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(
        409,
        r#"{"conflictingRequest": {"code": 409, "message": "Share is busy."}}"#,
    )]);

    sfs(home.path())
        .args(["--endpoint", &server.endpoint(), "--os-token", "t"])
        .args(["--api-version", "2.40", "extend", "a", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "ERROR: Share is busy. (HTTP 409) (Request-ID: req-409)",
        ));
}

#[test]
fn test_config_set_get_and_use() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(200, r#"{"shares": []}"#)]);

    sfs(home.path())
        .args(["config", "endpoint", &server.endpoint()])
        .assert()
        .success();
    sfs(home.path())
        .args(["config", "api_version", "2.60"])
        .assert()
        .success();

    sfs(home.path())
        .args(["config", "api_version"])
        .assert()
        .success()
        .stdout("api_version = 2.60\n");
    sfs(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("format = table"));

    sfs(home.path())
        .args(["--os-token", "t", "list"])
        .assert()
        .success();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].header("X-OpenStack-Manila-API-Version"),
        Some("2.60")
    );
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .args(["config", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key: colour"));
}

#[test]
fn test_cached_ids_complete_in_the_shell() {
    let home = tempfile::tempdir().unwrap();
    let server = StubServer::start(vec![(
        200,
        r#"{"shares": [{"id": "s1", "name": "a"}, {"id": "s2", "name": "b"}]}"#,
    )]);
    let endpoint = server.endpoint();

    sfs(home.path())
        .args(["--endpoint", &endpoint, "--os-token", "t", "--os-cache"])
        .args(["--api-version", "2.40", "list"])
        .assert()
        .success();

    sfs(home.path())
        .env("COMPLETE", "fish")
        .args(["--", "sfs", "--endpoint", &endpoint, "--os-token", "t", "show", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("s1"))
        .stdout(predicate::str::contains("s2"));

    sfs(home.path())
        .env("COMPLETE", "fish")
        .args(["--", "sfs", "--endpoint", &endpoint, "--os-token", "other", "show", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("s1").not());

    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_completion_registration_script() {
    let home = tempfile::tempdir().unwrap();
    sfs(home.path())
        .env("COMPLETE", "bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("sfs"));
}
