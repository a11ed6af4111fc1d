//! The issue-tracker capability used by front ends.
//!
//! Callers that only need to authenticate, search issues and apply commands
//! are written against [`IssueTracker`] rather than the concrete client, so
//! they can be exercised without a server.

use std::future::Future;

use crate::client::YouTrackClient;
use crate::error::Result;
use crate::models::{Issue, IssueQuery};

/// Minimal set of operations a release workflow needs from an issue tracker
pub trait IssueTracker {
  /// Establish a session if the authentication mode needs one
  fn authenticate(&self) -> impl Future<Output = Result<()>>;

  /// Collect the issues matching `query`
  fn enumerate_issues(&self, query: &IssueQuery) -> impl Future<Output = Result<Vec<Issue>>>;

  /// Apply `command` to the issues `ids`
  fn run_command(&self, command: &str, ids: &[String], comment: Option<&str>) -> impl Future<Output = Result<()>>;
}

impl IssueTracker for YouTrackClient {
  fn authenticate(&self) -> impl Future<Output = Result<()>> {
    self.login()
  }

  fn enumerate_issues(&self, query: &IssueQuery) -> impl Future<Output = Result<Vec<Issue>>> {
    self.get_issues(query)
  }

  fn run_command(&self, command: &str, ids: &[String], comment: Option<&str>) -> impl Future<Output = Result<()>> {
    YouTrackClient::run_command(self, command, ids, comment)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;
  use crate::models::Authentication;

  async fn close_open_issues(tracker: &impl IssueTracker) -> Result<usize> {
    tracker.authenticate().await?;
    let issues = tracker.enumerate_issues(&IssueQuery::new().query("#Unresolved")).await?;
    let ids: Vec<String> = issues.into_iter().map(|issue| issue.readable_id).collect();
    tracker.run_command("State Fixed", &ids, None).await?;
    Ok(ids.len())
  }

  #[tokio::test]
  async fn test_client_as_tracker() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let client = YouTrackClient::new(&mock_server.uri(), Authentication::Anonymous)?;

    Mock::given(method("GET"))
      .and(path("/api/issues"))
      .respond_with(ResponseTemplate::new(200).set_body_json(json!([
        {"idReadable": "DEMO-1"},
        {"idReadable": "DEMO-2"}
      ])))
      .mount(&mock_server)
      .await;
    Mock::given(method("POST"))
      .and(path("/api/commands"))
      .respond_with(ResponseTemplate::new(200))
      .expect(1)
      .mount(&mock_server)
      .await;

    assert_eq!(close_open_issues(&client).await?, 2);
    Ok(())
  }
}
