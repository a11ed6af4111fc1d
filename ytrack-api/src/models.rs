//! Data types exchanged with YouTrack.
//!
//! Public types are the client's view of the server's entities. The `Raw*`
//! types mirror the JSON the server returns, where nearly every attribute is
//! optional, and the request types mirror the payloads it accepts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ytrack_core::consts::{DEFAULT_STATUS_FIELD, DEFAULT_TYPE_FIELD};

use crate::consts::VERSION_BUNDLE_ELEMENT;

/// How the client authenticates, resolved once when it is built
#[derive(Clone, PartialEq, Eq)]
pub enum Authentication {
  /// Permanent token sent as a bearer header
  Token(String),
  /// Session login with a user name and password
  Password { username: String, password: String },
  /// No credentials
  Anonymous,
}

impl Authentication {
  /// Pick the authentication mode from optional credential parts.
  ///
  /// A token always wins over a user name. Empty values count as absent.
  pub fn resolve(token: Option<&str>, username: Option<&str>, password: Option<&str>) -> Self {
    fn present(value: Option<&str>) -> Option<&str> {
      value.filter(|value| !value.trim().is_empty())
    }

    match (present(token), present(username)) {
      (Some(token), _) => Self::Token(token.to_string()),
      (None, Some(username)) => Self::Password {
        username: username.to_string(),
        password: password.unwrap_or_default().to_string(),
      },
      (None, None) => Self::Anonymous,
    }
  }

  /// Short description used in log lines and error messages
  pub fn describe(&self) -> String {
    match self {
      Self::Token(_) => "permanent token".to_string(),
      Self::Password { username, .. } => format!("user {username}"),
      Self::Anonymous => "anonymous user".to_string(),
    }
  }
}

impl std::fmt::Debug for Authentication {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Token(_) => f.write_str("Token(<redacted>)"),
      Self::Password { username, .. } => f
        .debug_struct("Password")
        .field("username", username)
        .field("password", &"<redacted>")
        .finish(),
      Self::Anonymous => f.write_str("Anonymous"),
    }
  }
}

/// A YouTrack project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
  pub id: String,
  pub name: String,
  pub short_name: String,
}

impl Project {
  /// True when `name` is the project's name or short name
  pub fn matches(&self, name: &str) -> bool {
    self.name == name || self.short_name == name
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProject {
  id: Option<String>,
  name: Option<String>,
  short_name: Option<String>,
}

impl RawProject {
  pub(crate) fn into_project(self) -> Option<Project> {
    match (non_empty(self.id), non_empty(self.name), non_empty(self.short_name)) {
      (Some(id), Some(name), Some(short_name)) => Some(Project { id, name, short_name }),
      (id, name, _) => {
        debug!("Skipping incomplete project entry (id: {id:?}, name: {name:?})");
        None
      }
    }
  }
}

/// One entry of an issue's `customFields` array
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomFieldValue {
  pub name: Option<String>,
  #[serde(default)]
  pub value: Value,
}

impl CustomFieldValue {
  /// Name of the value; the first value's name for multi-value fields
  pub fn value_name(&self) -> Option<&str> {
    let value = match &self.value {
      Value::Array(values) => values.first()?,
      value => value,
    };
    value.get("name")?.as_str()
  }
}

/// An issue's custom fields, looked up by field name
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(Vec<CustomFieldValue>);

impl CustomFields {
  /// Value name of the field called `field`, ignoring case.
  ///
  /// Missing fields, empty values and values without a name all yield `None`.
  pub fn get(&self, field: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|entry| entry.name.as_deref().is_some_and(|name| name.eq_ignore_ascii_case(field)))?
      .value_name()
  }
}

/// A YouTrack issue
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
  pub readable_id: String,
  pub summary: Option<String>,
  pub description: Option<String>,
  pub reporter: Option<String>,
  pub created: Option<DateTime<Utc>>,
  pub resolved_at: Option<DateTime<Utc>>,
  pub status: Option<String>,
  pub issue_type: Option<String>,
  pub url: String,
  pub custom_fields: CustomFields,
}

impl Issue {
  pub(crate) fn from_raw(raw: RawIssue, status_field: &str, type_field: &str, server_root: &str) -> Option<Self> {
    let Some(readable_id) = non_empty(raw.id_readable) else {
      debug!("Skipping issue without a readable id (id: {:?})", raw.id);
      return None;
    };

    let status = raw.custom_fields.get(status_field).map(str::to_string);
    let issue_type = raw.custom_fields.get(type_field).map(str::to_string);

    Some(Self {
      url: format!("{server_root}issue/{readable_id}"),
      readable_id,
      summary: raw.summary,
      description: raw.description,
      reporter: raw.reporter.and_then(|user| user.full_name),
      created: raw.created.and_then(DateTime::from_timestamp_millis),
      resolved_at: raw.resolved.and_then(DateTime::from_timestamp_millis),
      status,
      issue_type,
      custom_fields: raw.custom_fields,
    })
  }

  /// True when the issue has been resolved
  pub fn is_closed(&self) -> bool {
    self.resolved_at.is_some()
  }

  /// The issue's state, or `Closed`/`Open` by resolution when it has none
  pub fn display_status(&self) -> &str {
    match &self.status {
      Some(status) => status,
      None if self.is_closed() => "Closed",
      None => "Open",
    }
  }

  /// The issue's type, or `Issue` when it has none
  pub fn display_type(&self) -> &str {
    self.issue_type.as_deref().unwrap_or("Issue")
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawIssue {
  id: Option<String>,
  id_readable: Option<String>,
  summary: Option<String>,
  description: Option<String>,
  reporter: Option<RawUser>,
  created: Option<i64>,
  resolved: Option<i64>,
  #[serde(default)]
  custom_fields: CustomFields,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawUser {
  full_name: Option<String>,
}

/// A custom field attached to a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCustomField {
  pub id: String,
  pub name: String,
  /// YouTrack's `$type`, e.g. `VersionProjectCustomField`
  pub kind: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProjectCustomField {
  id: Option<String>,
  #[serde(rename = "$type")]
  kind: Option<String>,
  field: Option<RawFieldName>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFieldName {
  name: Option<String>,
}

impl RawProjectCustomField {
  pub(crate) fn into_field(self) -> Option<ProjectCustomField> {
    let name = non_empty(self.field.and_then(|field| field.name));
    match (non_empty(self.id), name) {
      (Some(id), Some(name)) => Some(ProjectCustomField {
        id,
        name,
        kind: self.kind.unwrap_or_default(),
      }),
      _ => {
        debug!("Skipping project custom field without id or name");
        None
      }
    }
  }
}

/// A value of a version bundle
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Version {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub released: bool,
  #[serde(default)]
  pub archived: bool,
}

/// A value of any bundle; only its name is of interest
#[derive(Debug, Deserialize)]
pub(crate) struct RawBundleValue {
  pub(crate) name: Option<String>,
}

/// Outcome of ensuring a version exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
  /// The version did not exist and was created
  Created,
  /// The version existed and its flags were changed
  Updated,
  /// The version existed with the requested flags
  Unchanged,
}

/// The user the client is authenticated as
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
  pub login: String,
  pub full_name: Option<String>,
}

/// Parameters of an issue search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
  pub project: Option<String>,
  pub query: Option<String>,
  pub status_field: String,
  pub type_field: String,
}

impl Default for IssueQuery {
  fn default() -> Self {
    Self {
      project: None,
      query: None,
      status_field: DEFAULT_STATUS_FIELD.to_string(),
      type_field: DEFAULT_TYPE_FIELD.to_string(),
    }
  }
}

impl IssueQuery {
  pub fn new() -> Self {
    Self::default()
  }

  /// Restrict the search to a project, by name or short name
  pub fn project(mut self, project: impl Into<String>) -> Self {
    self.project = Some(project.into());
    self
  }

  /// Add a YouTrack search query
  pub fn query(mut self, query: impl Into<String>) -> Self {
    self.query = Some(query.into());
    self
  }

  /// Name of the field read into [`Issue::status`]
  pub fn status_field(mut self, field: impl Into<String>) -> Self {
    self.status_field = field.into();
    self
  }

  /// Name of the field read into [`Issue::issue_type`]
  pub fn type_field(mut self, field: impl Into<String>) -> Self {
    self.type_field = field.into();
    self
  }

  /// The combined search text, `project: {<project>} <query>`
  pub fn search_text(&self) -> Option<String> {
    let project = self
      .project
      .as_deref()
      .map(str::trim)
      .filter(|project| !project.is_empty())
      .map(|project| format!("project: {{{project}}}"));
    let query = self.query.as_deref().map(str::trim).filter(|query| !query.is_empty());

    match (project, query) {
      (Some(project), Some(query)) => Some(format!("{project} {query}")),
      (Some(project), None) => Some(project),
      (None, Some(query)) => Some(query.to_string()),
      (None, None) => None,
    }
  }
}

/// Reference to an entity by database id
#[derive(Debug, Serialize)]
pub(crate) struct EntityRef<'a> {
  pub(crate) id: &'a str,
}

/// Payload of a new issue
#[derive(Debug, Serialize)]
pub(crate) struct CreateIssueRequest<'a> {
  pub(crate) project: EntityRef<'a>,
  pub(crate) summary: &'a str,
  pub(crate) description: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatedIssue {
  pub(crate) id_readable: String,
}

/// Reference to an issue by readable id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IssueRef<'a> {
  pub(crate) id_readable: &'a str,
}

/// Payload of a command applied to a batch of issues
#[derive(Debug, Serialize)]
pub(crate) struct CommandRequest<'a> {
  pub(crate) query: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) comment: Option<&'a str>,
  pub(crate) issues: Vec<IssueRef<'a>>,
}

/// Payload creating or updating a version bundle value
#[derive(Debug, Serialize)]
pub(crate) struct VersionPayload<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub(crate) id: Option<&'a str>,
  pub(crate) name: &'a str,
  pub(crate) released: bool,
  pub(crate) archived: bool,
  #[serde(rename = "$type")]
  pub(crate) kind: &'static str,
}

impl<'a> VersionPayload<'a> {
  pub(crate) fn new(id: Option<&'a str>, name: &'a str, released: bool, archived: bool) -> Self {
    Self {
      id,
      name,
      released,
      archived,
      kind: VERSION_BUNDLE_ELEMENT,
    }
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|value| !value.is_empty())
}
