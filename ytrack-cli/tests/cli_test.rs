use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `ytrack` command isolated from the user's home, config and credentials
fn ytrack(home: &TempDir) -> Command {
  let mut cmd = cargo_bin_cmd!("ytrack");
  cmd
    .env("HOME", home.path())
    .env("XDG_CONFIG_HOME", home.path().join(".config"))
    .env_remove("YOUTRACK_URL")
    .env_remove("YOUTRACK_TOKEN")
    .env_remove("YOUTRACK_USERNAME")
    .env_remove("YOUTRACK_PASSWORD")
    .args(["--colors", "never"]);
  cmd
}

/// A `ytrack` command pointed at a mock server with a permanent token
fn ytrack_against(home: &TempDir, server: &MockServer) -> Command {
  let mut cmd = ytrack(home);
  cmd.env("YOUTRACK_URL", server.uri()).env("YOUTRACK_TOKEN", "perm:cli");
  cmd
}

async fn mount_demo_project(server: &MockServer) {
  Mock::given(method("GET"))
    .and(path("/api/admin/projects"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "0-1", "name": "Demo", "shortName": "DEMO"}
    ])))
    .mount(server)
    .await;
  Mock::given(method("GET"))
    .and(path("/api/admin/projects/0-1/customFields"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "92-1", "$type": "VersionProjectCustomField", "field": {"name": "Fix version"}},
      {"id": "92-2", "$type": "StateProjectCustomField", "field": {"name": "State"}}
    ])))
    .mount(server)
    .await;
}

#[test]
fn help_lists_subcommands() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("issue"))
    .stdout(predicate::str::contains("version"))
    .stdout(predicate::str::contains("project"))
    .stdout(predicate::str::contains("creds"));
}

#[test]
fn issue_command_needs_ids_or_query() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .args(["issue", "command", "tag release"])
    .env("YOUTRACK_URL", "http://127.0.0.1:9")
    .assert()
    .failure()
    .stderr(predicate::str::contains("--ids"));
}

#[test]
fn ids_and_query_conflict() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .args(["issue", "comment", "hello", "--ids", "DEMO-1", "--query", "#Bug"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn missing_server_url_is_reported() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .args(["project", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("YOUTRACK_URL"));
}

#[test]
fn config_set_then_show() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .args([
      "config",
      "set",
      "--server-url",
      "yt.example.com/youtrack",
      "--project",
      "DEMO",
      "--version-field",
      "Affected versions",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("Saved configuration"));

  ytrack(&home)
    .args(["config", "show"])
    .assert()
    .success()
    .stdout(predicate::str::contains("https://yt.example.com/youtrack"))
    .stdout(predicate::str::contains("Default project: DEMO"))
    .stdout(predicate::str::contains("Version field: Affected versions"))
    .stdout(predicate::str::contains("State field: State"));
}

#[test]
fn completion_script_is_generated() {
  let home = TempDir::new().unwrap();

  ytrack(&home)
    .args(["completion", "bash"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ytrack"));
}

#[tokio::test(flavor = "multi_thread")]
async fn issue_query_prints_table() {
  let home = TempDir::new().unwrap();
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/issues"))
    .and(header("authorization", "Bearer perm:cli"))
    .and(query_param("query", "project: {DEMO} Fix version: {1.2} #Unresolved"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {
        "id": "2-1",
        "idReadable": "DEMO-1",
        "summary": "Crash on start",
        "customFields": [
          {"name": "State", "value": {"name": "Open"}},
          {"name": "Type", "value": {"name": "Bug"}}
        ]
      },
      {"id": "2-2", "idReadable": "DEMO-2", "summary": "Slow search", "customFields": []}
    ])))
    .expect(1)
    .mount(&server)
    .await;

  ytrack_against(&home, &server)
    .args([
      "issue",
      "query",
      "--project",
      "DEMO",
      "--release",
      "1.2",
      "--query",
      "#Unresolved",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("DEMO-1"))
    .stdout(predicate::str::contains("Crash on start"))
    .stdout(predicate::str::contains("Bug"))
    .stdout(predicate::str::contains("DEMO-2"))
    .stdout(predicate::str::contains("2 issue(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_query_yields_no_issues() {
  let home = TempDir::new().unwrap();
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/issues"))
    .respond_with(ResponseTemplate::new(400).set_body_json(json!({
      "error": "invalid_query",
      "error_description": "Unknown value 9.9"
    })))
    .mount(&server)
    .await;

  ytrack_against(&home, &server)
    .args(["issue", "query", "--release", "9.9"])
    .assert()
    .success()
    .stdout(predicate::str::contains("No issues found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn issue_state_sends_one_command() {
  let home = TempDir::new().unwrap();
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/api/commands"))
    .and(body_json(json!({
      "query": "State Fixed",
      "comment": "Released in 1.2",
      "issues": [{"idReadable": "DEMO-1"}, {"idReadable": "DEMO-2"}]
    })))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&server)
    .await;

  ytrack_against(&home, &server)
    .args([
      "issue",
      "state",
      "Fixed",
      "--ids",
      "DEMO-1,DEMO-2,DEMO-1",
      "--comment",
      "Released in 1.2",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("DEMO-1"))
    .stdout(predicate::str::contains("DEMO-2"));
}

#[tokio::test(flavor = "multi_thread")]
async fn version_ensure_creates_then_skips() {
  let home = TempDir::new().unwrap();
  let server = MockServer::start().await;
  mount_demo_project(&server).await;

  let values = "/api/admin/projects/0-1/customFields/92-1/bundle/values";
  Mock::given(method("GET"))
    .and(path(values))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      {"id": "135-1", "name": "1.1", "released": true, "archived": false}
    ])))
    .mount(&server)
    .await;
  Mock::given(method("POST"))
    .and(path(values))
    .and(body_json(json!({
      "$type": "VersionBundleElement",
      "name": "1.2",
      "released": false,
      "archived": false
    })))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "135-2"})))
    .expect(1)
    .mount(&server)
    .await;

  ytrack_against(&home, &server)
    .args(["version", "ensure", "1.2", "--project", "DEMO"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Created version 1.2 in DEMO"));

  ytrack_against(&home, &server)
    .args(["version", "ensure", "1.1", "--project", "DEMO", "--released", "true"])
    .assert()
    .success()
    .stdout(predicate::str::contains("already up to date"));
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_token_fails_with_authentication_error() {
  let home = TempDir::new().unwrap();
  let server = MockServer::start().await;

  Mock::given(method("GET"))
    .and(path("/api/admin/projects"))
    .respond_with(ResponseTemplate::new(403))
    .expect(1)
    .mount(&server)
    .await;

  ytrack_against(&home, &server)
    .args(["project", "list"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Authentication failed for permanent token"));
}
