//! # Command Endpoints
//!
//! YouTrack applies changes such as state transitions or comments through
//! commands written in its command language, e.g. `State Fixed`.

use tracing::debug;

use crate::client::{ApiRequest, YouTrackClient};
use crate::error::Result;
use crate::models::{CommandRequest, IssueRef};

impl YouTrackClient {
  /// Apply `command` to a batch of issues in a single request.
  ///
  /// Nothing is sent when `ids` is empty. A blank comment is omitted.
  pub async fn run_command(&self, command: &str, ids: &[String], comment: Option<&str>) -> Result<()> {
    if ids.is_empty() {
      debug!("No issues to apply '{command}' to");
      return Ok(());
    }

    let payload = CommandRequest {
      query: command,
      comment: comment.filter(|comment| !comment.trim().is_empty()),
      issues: ids.iter().map(|id| IssueRef { id_readable: id }).collect(),
    };
    debug!("Applying '{command}' to {} issue(s)", ids.len());

    self.send_empty(&ApiRequest::post("commands").json(&payload)?).await
  }

  /// Add the same comment to each issue
  pub async fn add_comment(&self, ids: &[String], comment: &str) -> Result<()> {
    self.run_command("comment", ids, Some(comment)).await
  }

  /// Move issues to `state` through the status field named `status_field`
  pub async fn change_state(
    &self,
    status_field: &str,
    state: &str,
    ids: &[String],
    comment: Option<&str>,
  ) -> Result<()> {
    self
      .run_command(&format!("{status_field} {state}"), ids, comment)
      .await
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::matchers::{body_json, method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use crate::client::YouTrackClient;
  use crate::models::Authentication;

  fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
  }

  #[tokio::test]
  async fn test_empty_batch_sends_nothing() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = YouTrackClient::new(&mock_server.uri(), Authentication::Anonymous)?;

    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&mock_server)
      .await;

    client.run_command("State Fixed", &[], Some("done")).await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_run_command_batches_ids() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = YouTrackClient::new(&mock_server.uri(), Authentication::Anonymous)?;

    Mock::given(method("POST"))
      .and(path("/api/commands"))
      .and(body_json(json!({
        "query": "State Fixed",
        "comment": "Released in 1.2",
        "issues": [{"idReadable": "DEMO-1"}, {"idReadable": "DEMO-2"}]
      })))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
      .expect(1)
      .mount(&mock_server)
      .await;

    client
      .change_state("State", "Fixed", &ids(&["DEMO-1", "DEMO-2"]), Some("Released in 1.2"))
      .await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_blank_comment_is_omitted() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = YouTrackClient::new(&mock_server.uri(), Authentication::Anonymous)?;

    Mock::given(method("POST"))
      .and(path("/api/commands"))
      .and(body_json(json!({"query": "tag release", "issues": [{"idReadable": "DEMO-3"}]})))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&mock_server)
      .await;

    client.run_command("tag release", &ids(&["DEMO-3"]), Some("  ")).await?;
    Ok(())
  }

  #[tokio::test]
  async fn test_add_comment() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = YouTrackClient::new(&mock_server.uri(), Authentication::Anonymous)?;

    Mock::given(method("POST"))
      .and(path("/api/commands"))
      .and(body_json(json!({
        "query": "comment",
        "comment": "Deployed to staging",
        "issues": [{"idReadable": "DEMO-4"}]
      })))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&mock_server)
      .await;

    client.add_comment(&ids(&["DEMO-4"]), "Deployed to staging").await?;
    Ok(())
  }
}
