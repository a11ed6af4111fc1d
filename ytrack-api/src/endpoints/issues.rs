//! # YouTrack Issue Endpoints
//!
//! Creating issues and searching them. Searches yield issues lazily, page by
//! page, with state and type read from the configured custom fields.

use futures::{Stream, TryStreamExt};
use tracing::info;

use crate::client::{ApiRequest, YouTrackClient};
use crate::error::Result;
use crate::models::{CreateIssueRequest, CreatedIssue, EntityRef, Issue, IssueQuery, RawIssue};
use crate::pagination::Paginator;

const ISSUE_FIELDS: &str =
  "id,idReadable,summary,description,reporter(fullName),created,resolved,customFields(name,value(name))";

/// Query text selecting the issues mapped to a release through a version
/// field, e.g. `Fix version: {1.2}`
pub fn release_query(version_field: &str, release: &str) -> String {
  format!("{version_field}: {{{release}}}")
}

impl YouTrackClient {
  /// Create an issue and return its readable id.
  ///
  /// Without `project` the client's default project is used.
  pub async fn create_issue(&self, project: Option<&str>, summary: &str, description: &str) -> Result<String> {
    let project = self.project_or_default(project).await?;

    let request = ApiRequest::post("issues")
      .query("fields", "idReadable")
      .json(&CreateIssueRequest {
        project: EntityRef { id: &project.id },
        summary,
        description,
      })?;
    let created: CreatedIssue = self.send_json(&request).await?;

    info!("Created issue {} in project {}", created.id_readable, project.name);
    Ok(created.id_readable)
  }

  /// Stream the issues matching `query`.
  ///
  /// When YouTrack rejects the query as `invalid_query`, typically because it
  /// filters on a field value that does not exist (such as an unknown
  /// release), the stream ends empty instead of failing. Genuine syntax
  /// mistakes are hidden the same way.
  pub fn issues<'a>(&'a self, query: &'a IssueQuery) -> impl Stream<Item = Result<Issue>> + 'a {
    let mut pager = Paginator::new(self, "issues")
      .query("fields", ISSUE_FIELDS)
      .tolerate_invalid_query();
    if let Some(text) = query.search_text() {
      pager = pager.query("query", text);
    }

    pager.decode(move |raw: RawIssue| {
      Issue::from_raw(raw, &query.status_field, &query.type_field, self.server_root())
    })
  }

  /// Collect the issues matching `query`; see [`YouTrackClient::issues`]
  pub async fn get_issues(&self, query: &IssueQuery) -> Result<Vec<Issue>> {
    self.issues(query).try_collect().await
  }
}
