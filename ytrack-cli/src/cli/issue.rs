//! # Issue Command
//!
//! Derive-based implementation of the issue command: creating issues,
//! searching them, and applying YouTrack commands to batches of issues
//! selected by ID or by query.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::debug;
use ytrack_api::{Issue, IssueQuery, IssueTracker, release_query};
use ytrack_core::config::FieldNames;
use ytrack_core::output::{format_issue_id, format_state, print_info, print_success, print_warning};

use crate::cli::GlobalArgs;
use crate::clients::{self, Session};

/// Command for working with issues
#[derive(Args)]
pub struct IssueArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: IssueSubcommands,
}

/// Subcommands for the issue command
#[derive(Subcommand)]
pub enum IssueSubcommands {
  /// Create an issue
  #[command(long_about = "Create an issue and print its readable ID.\n\n\
                         Without --project the configured default project is used.")]
  Create {
    /// Project name or short name
    #[arg(long, short = 'p')]
    project: Option<String>,

    /// Issue summary
    #[arg(long, short = 's')]
    summary: String,

    /// Issue description
    #[arg(long, short = 'd', default_value = "")]
    description: String,
  },

  /// Search issues
  #[command(long_about = "Search issues with a YouTrack query and print them as a table.\n\n\
                         --release narrows the search to issues whose version field holds the\n\
                         given release. A query YouTrack rejects as invalid (for example one\n\
                         naming a release that does not exist) yields no issues.")]
  #[command(alias = "search")]
  Query {
    /// Project name or short name
    #[arg(long, short = 'p')]
    project: Option<String>,

    /// YouTrack search query (e.g. "#Unresolved")
    #[arg(long, short = 'q')]
    query: Option<String>,

    /// Only issues mapped to this release through the version field
    #[arg(long, short = 'r')]
    release: Option<String>,

    /// Show reporter, timestamps and links as well
    #[arg(long)]
    details: bool,
  },

  /// Apply a YouTrack command to issues
  #[command(long_about = "Apply a YouTrack command such as 'Fix version 1.2' or 'tag release'\n\
                         to every selected issue in one request.")]
  Command {
    /// The YouTrack command text
    #[arg(index = 1)]
    command: String,

    #[command(flatten)]
    targets: IssueTargets,

    /// Comment added together with the command
    #[arg(long, short = 'c')]
    comment: Option<String>,
  },

  /// Comment on issues
  Comment {
    /// The comment text
    #[arg(index = 1)]
    comment: String,

    #[command(flatten)]
    targets: IssueTargets,
  },

  /// Move issues to another state
  #[command(long_about = "Set the state field of every selected issue.\n\n\
                         The state field name comes from the configuration (default 'State').")]
  State {
    /// The target state (e.g. Fixed)
    #[arg(index = 1)]
    state: String,

    #[command(flatten)]
    targets: IssueTargets,

    /// Comment added together with the state change
    #[arg(long, short = 'c')]
    comment: Option<String>,
  },
}

/// Selects the issues a command applies to
#[derive(Args, Debug, Clone, Default)]
pub struct IssueTargets {
  /// Readable issue IDs, comma separated (e.g. DEMO-1,DEMO-2)
  #[arg(long, value_delimiter = ',', num_args = 1.., required_unless_present = "query", conflicts_with = "query")]
  pub ids: Vec<String>,

  /// Select the issues matching this YouTrack query instead
  #[arg(long, short = 'q')]
  pub query: Option<String>,

  /// Restrict --query to a project
  #[arg(long, short = 'p')]
  pub project: Option<String>,
}

#[derive(Tabled)]
struct IssueRow {
  #[tabled(rename = "ID")]
  id: String,
  #[tabled(rename = "Type")]
  issue_type: String,
  #[tabled(rename = "State")]
  state: String,
  #[tabled(rename = "Summary")]
  summary: String,
}

impl From<&Issue> for IssueRow {
  fn from(issue: &Issue) -> Self {
    Self {
      id: issue.readable_id.clone(),
      issue_type: issue.display_type().to_string(),
      state: issue.display_status().to_string(),
      summary: issue.summary.clone().unwrap_or_default(),
    }
  }
}

#[derive(Tabled)]
struct DetailedIssueRow {
  #[tabled(rename = "ID")]
  id: String,
  #[tabled(rename = "Type")]
  issue_type: String,
  #[tabled(rename = "State")]
  state: String,
  #[tabled(rename = "Summary")]
  summary: String,
  #[tabled(rename = "Description")]
  description: String,
  #[tabled(rename = "Reporter")]
  reporter: String,
  #[tabled(rename = "Created")]
  created: String,
  #[tabled(rename = "Resolved")]
  resolved: String,
  #[tabled(rename = "URL")]
  url: String,
}

fn format_timestamp(timestamp: Option<DateTime<Utc>>) -> String {
  timestamp
    .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
    .unwrap_or_else(|| "-".to_string())
}

impl From<&Issue> for DetailedIssueRow {
  fn from(issue: &Issue) -> Self {
    Self {
      id: issue.readable_id.clone(),
      issue_type: issue.display_type().to_string(),
      state: issue.display_status().to_string(),
      summary: issue.summary.clone().unwrap_or_default(),
      description: issue.description.clone().unwrap_or_default(),
      reporter: issue.reporter.clone().unwrap_or_else(|| "-".to_string()),
      created: format_timestamp(issue.created),
      resolved: format_timestamp(issue.resolved_at),
      url: issue.url.clone(),
    }
  }
}

/// Handle the issue command
pub(crate) fn handle_issue_command(issue: IssueArgs, global: &GlobalArgs) -> Result<()> {
  let session = clients::connect(global)?;

  match issue.subcommand {
    IssueSubcommands::Create {
      project,
      summary,
      description,
    } => handle_create_command(&session, project.as_deref(), &summary, &description),
    IssueSubcommands::Query {
      project,
      query,
      release,
      details,
    } => handle_query_command(
      &session,
      project.as_deref(),
      query.as_deref(),
      release.as_deref(),
      details,
    ),
    IssueSubcommands::Command {
      command,
      targets,
      comment,
    } => {
      let ids = run_on_targets(&session, &command, &targets, comment.as_deref())?;
      report_applied(&format!("Applied '{command}' to"), &ids);
      Ok(())
    }
    IssueSubcommands::Comment { comment, targets } => {
      let ids = run_on_targets(&session, "comment", &targets, Some(&comment))?;
      report_applied("Commented on", &ids);
      Ok(())
    }
    IssueSubcommands::State {
      state,
      targets,
      comment,
    } => {
      let command = format!("{} {state}", session.config.fields.status);
      let ids = run_on_targets(&session, &command, &targets, comment.as_deref())?;
      report_applied(&format!("Moved to {} in", format_state(&state, false)), &ids);
      Ok(())
    }
  }
}

fn handle_create_command(session: &Session, project: Option<&str>, summary: &str, description: &str) -> Result<()> {
  let project = session.project(project)?;
  let id = session
    .block_on(session.client.create_issue(Some(&project), summary, description))
    .with_context(|| format!("Failed to create issue in project '{project}'"))?;

  print_success(&format!("Created issue {}", format_issue_id(&id)));
  Ok(())
}

/// Combine a free-form query and a release filter into one query text
fn combine_query(query: Option<&str>, release: Option<&str>, fields: &FieldNames) -> Option<String> {
  let release = release
    .map(str::trim)
    .filter(|release| !release.is_empty())
    .map(|release| release_query(&fields.version, release));
  let query = query.map(str::trim).filter(|query| !query.is_empty());

  match (release, query) {
    (Some(release), Some(query)) => Some(format!("{release} {query}")),
    (Some(release), None) => Some(release),
    (None, Some(query)) => Some(query.to_string()),
    (None, None) => None,
  }
}

fn handle_query_command(
  session: &Session,
  project: Option<&str>,
  query: Option<&str>,
  release: Option<&str>,
  details: bool,
) -> Result<()> {
  let fields = &session.config.fields;
  let mut search = IssueQuery::new()
    .status_field(fields.status.as_str())
    .type_field(fields.issue_type.as_str());
  if let Some(project) = project.or(session.config.default_project.as_deref()) {
    search = search.project(project);
  }
  if let Some(text) = combine_query(query, release, fields) {
    search = search.query(text);
  }
  debug!("Searching issues with {:?}", search.search_text());

  let issues = session
    .block_on(async {
      session.client.authenticate().await?;
      session.client.enumerate_issues(&search).await
    })
    .context("Failed to search issues")?;

  if issues.is_empty() {
    print_info("No issues found");
    return Ok(());
  }

  let table = if details {
    let rows: Vec<DetailedIssueRow> = issues.iter().map(DetailedIssueRow::from).collect();
    Table::new(rows).with(Style::sharp()).to_string()
  } else {
    let rows: Vec<IssueRow> = issues.iter().map(IssueRow::from).collect();
    Table::new(rows).with(Style::sharp()).to_string()
  };
  println!("{table}");
  print_info(&format!("{} issue(s)", issues.len()));
  Ok(())
}

fn run_on_targets(session: &Session, command: &str, targets: &IssueTargets, comment: Option<&str>) -> Result<Vec<String>> {
  let config = &session.config;
  session.block_on(apply_command(
    &session.client,
    command,
    targets,
    comment,
    &config.fields,
    config.default_project.as_deref(),
  ))
}

fn report_applied(action: &str, ids: &[String]) {
  if ids.is_empty() {
    print_warning("No issues matched; nothing to do");
    return;
  }
  let formatted: Vec<String> = ids.iter().map(|id| format_issue_id(id)).collect();
  print_success(&format!("{action} {}", formatted.join(", ")));
}

/// Trim, drop empty entries and remove duplicates while keeping order
fn normalize_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
  let mut normalized: Vec<String> = Vec::new();
  for id in ids {
    let id = id.trim();
    if !id.is_empty() && !normalized.iter().any(|seen| seen == id) {
      normalized.push(id.to_string());
    }
  }
  normalized
}

/// Issues picked on the command line, checked before anything is sent
enum Selection<'a> {
  Ids(Vec<String>),
  Query(&'a str),
}

/// Explicit IDs win over the query; blank values count as absent
fn select_targets(targets: &IssueTargets) -> Result<Selection<'_>> {
  let ids = normalize_ids(targets.ids.iter().cloned());
  if !ids.is_empty() {
    return Ok(Selection::Ids(ids));
  }

  match targets.query.as_deref().filter(|query| !query.trim().is_empty()) {
    Some(query) => Ok(Selection::Query(query)),
    None => bail!("Missing required argument: pass --ids or --query"),
  }
}

/// Turn the selected targets into readable issue IDs.
///
/// Explicit IDs win; otherwise the issues matching the query are looked up.
pub async fn resolve_issue_ids<T: IssueTracker>(
  tracker: &T,
  targets: &IssueTargets,
  fields: &FieldNames,
  default_project: Option<&str>,
) -> Result<Vec<String>> {
  let selection = select_targets(targets)?;
  lookup_issue_ids(tracker, selection, targets.project.as_deref(), fields, default_project).await
}

async fn lookup_issue_ids<T: IssueTracker>(
  tracker: &T,
  selection: Selection<'_>,
  project: Option<&str>,
  fields: &FieldNames,
  default_project: Option<&str>,
) -> Result<Vec<String>> {
  let query = match selection {
    Selection::Ids(ids) => return Ok(ids),
    Selection::Query(query) => query,
  };

  let mut search = IssueQuery::new()
    .query(query)
    .status_field(fields.status.as_str())
    .type_field(fields.issue_type.as_str());
  if let Some(project) = project.or(default_project) {
    search = search.project(project);
  }

  let issues = tracker
    .enumerate_issues(&search)
    .await
    .with_context(|| format!("Failed to find issues for query '{query}'"))?;
  debug!("Query '{query}' selected {} issue(s)", issues.len());
  Ok(normalize_ids(issues.into_iter().map(|issue| issue.readable_id)))
}

/// Apply `command` to the selected issues and return their IDs
pub async fn apply_command<T: IssueTracker>(
  tracker: &T,
  command: &str,
  targets: &IssueTargets,
  comment: Option<&str>,
  fields: &FieldNames,
  default_project: Option<&str>,
) -> Result<Vec<String>> {
  let selection = select_targets(targets)?;
  tracker.authenticate().await.context("Failed to authenticate")?;

  let ids = lookup_issue_ids(tracker, selection, targets.project.as_deref(), fields, default_project).await?;
  if ids.is_empty() {
    return Ok(ids);
  }

  tracker
    .run_command(command, &ids, comment)
    .await
    .with_context(|| format!("Failed to apply '{command}' to {}", ids.join(", ")))?;
  Ok(ids)
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use ytrack_api::{CustomFields, YouTrackError};

  use super::*;

  #[derive(Default)]
  struct FakeTracker {
    issues: Vec<&'static str>,
    fail_search: bool,
    authenticated: RefCell<u32>,
    searches: RefCell<Vec<IssueQuery>>,
    commands: RefCell<Vec<(String, Vec<String>, Option<String>)>>,
  }

  fn issue(id: &str) -> Issue {
    Issue {
      readable_id: id.to_string(),
      summary: None,
      description: None,
      reporter: None,
      created: None,
      resolved_at: None,
      status: None,
      issue_type: None,
      url: format!("https://yt.example.com/issue/{id}"),
      custom_fields: CustomFields::default(),
    }
  }

  impl IssueTracker for FakeTracker {
    async fn authenticate(&self) -> ytrack_api::Result<()> {
      *self.authenticated.borrow_mut() += 1;
      Ok(())
    }

    async fn enumerate_issues(&self, query: &IssueQuery) -> ytrack_api::Result<Vec<Issue>> {
      self.searches.borrow_mut().push(query.clone());
      if self.fail_search {
        return Err(YouTrackError::Cancelled);
      }
      Ok(self.issues.iter().map(|id| issue(id)).collect())
    }

    async fn run_command(&self, command: &str, ids: &[String], comment: Option<&str>) -> ytrack_api::Result<()> {
      self
        .commands
        .borrow_mut()
        .push((command.to_string(), ids.to_vec(), comment.map(str::to_string)));
      Ok(())
    }
  }

  fn by_ids(ids: &[&str]) -> IssueTargets {
    IssueTargets {
      ids: ids.iter().map(|id| id.to_string()).collect(),
      ..IssueTargets::default()
    }
  }

  fn by_query(query: &str) -> IssueTargets {
    IssueTargets {
      query: Some(query.to_string()),
      ..IssueTargets::default()
    }
  }

  #[test]
  fn test_normalize_ids() {
    let ids = normalize_ids(
      [" DEMO-1", "", "DEMO-2 ", "DEMO-1", "  "]
        .into_iter()
        .map(str::to_string),
    );
    assert_eq!(ids, vec!["DEMO-1", "DEMO-2"]);
  }

  #[test]
  fn test_combine_query() {
    let fields = FieldNames::default();

    assert_eq!(combine_query(None, None, &fields), None);
    assert_eq!(combine_query(Some(" #Unresolved "), None, &fields).as_deref(), Some("#Unresolved"));
    assert_eq!(
      combine_query(None, Some("1.2"), &fields).as_deref(),
      Some("Fix version: {1.2}")
    );
    assert_eq!(
      combine_query(Some("#Bug"), Some("1.2"), &fields).as_deref(),
      Some("Fix version: {1.2} #Bug")
    );
  }

  #[tokio::test]
  async fn test_explicit_ids_skip_the_search() -> anyhow::Result<()> {
    let tracker = FakeTracker::default();

    let ids = resolve_issue_ids(&tracker, &by_ids(&["DEMO-1", "DEMO-1", "DEMO-2"]), &FieldNames::default(), None).await?;

    assert_eq!(ids, vec!["DEMO-1", "DEMO-2"]);
    assert!(tracker.searches.borrow().is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn test_query_targets_use_project_and_fields() -> anyhow::Result<()> {
    let tracker = FakeTracker {
      issues: vec!["DEMO-3", "DEMO-4"],
      ..FakeTracker::default()
    };
    let fields = FieldNames {
      status: "Stage".to_string(),
      ..FieldNames::default()
    };

    let ids = resolve_issue_ids(&tracker, &by_query("#Unresolved"), &fields, Some("DEMO")).await?;

    assert_eq!(ids, vec!["DEMO-3", "DEMO-4"]);
    let searches = tracker.searches.borrow();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].status_field, "Stage");
    assert_eq!(searches[0].search_text().as_deref(), Some("project: {DEMO} #Unresolved"));
    Ok(())
  }

  #[tokio::test]
  async fn test_missing_targets_is_an_error() {
    let tracker = FakeTracker::default();

    let error = resolve_issue_ids(&tracker, &by_ids(&[" ", ""]), &FieldNames::default(), None)
      .await
      .unwrap_err()
      .to_string();

    assert!(error.contains("--ids or --query"));
    assert!(tracker.searches.borrow().is_empty());
  }

  #[tokio::test]
  async fn test_blank_targets_fail_before_authenticating() {
    let tracker = FakeTracker::default();

    for targets in [by_query("  "), by_ids(&[" "])] {
      let error = apply_command(&tracker, "tag x", &targets, None, &FieldNames::default(), None)
        .await
        .unwrap_err()
        .to_string();
      assert!(error.contains("--ids or --query"));
    }

    assert_eq!(*tracker.authenticated.borrow(), 0);
    assert!(tracker.searches.borrow().is_empty());
    assert!(tracker.commands.borrow().is_empty());
  }

  #[tokio::test]
  async fn test_apply_command_runs_once_for_all_ids() -> anyhow::Result<()> {
    let tracker = FakeTracker {
      issues: vec!["DEMO-1", "DEMO-2"],
      ..FakeTracker::default()
    };

    let ids = apply_command(
      &tracker,
      "State Fixed",
      &by_query("Fix version: {1.2}"),
      Some("Released"),
      &FieldNames::default(),
      None,
    )
    .await?;

    assert_eq!(ids, vec!["DEMO-1", "DEMO-2"]);
    assert_eq!(*tracker.authenticated.borrow(), 1);
    assert_eq!(
      *tracker.commands.borrow(),
      vec![(
        "State Fixed".to_string(),
        vec!["DEMO-1".to_string(), "DEMO-2".to_string()],
        Some("Released".to_string())
      )]
    );
    Ok(())
  }

  #[tokio::test]
  async fn test_apply_command_with_no_matches_sends_nothing() -> anyhow::Result<()> {
    let tracker = FakeTracker::default();

    let ids = apply_command(&tracker, "tag release", &by_query("#Nothing"), None, &FieldNames::default(), None).await?;

    assert!(ids.is_empty());
    assert!(tracker.commands.borrow().is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn test_apply_command_reports_search_failures() {
    let tracker = FakeTracker {
      fail_search: true,
      ..FakeTracker::default()
    };

    let error = apply_command(&tracker, "tag release", &by_query("#Bug"), None, &FieldNames::default(), None)
      .await
      .unwrap_err();

    assert!(format!("{error:#}").contains("Failed to find issues for query '#Bug'"));
    assert!(tracker.commands.borrow().is_empty());
  }

  #[test]
  fn test_detailed_row_formats_missing_values() {
    let row = DetailedIssueRow::from(&issue("DEMO-9"));

    assert_eq!(row.state, "Open");
    assert_eq!(row.issue_type, "Issue");
    assert_eq!(row.reporter, "-");
    assert_eq!(row.created, "-");
    assert_eq!(row.description, "");
  }

  #[test]
  fn test_detailed_row_shows_description() {
    let row = DetailedIssueRow::from(&Issue {
      summary: Some("Crash on start".to_string()),
      description: Some("Stack trace attached".to_string()),
      ..issue("DEMO-5")
    });

    assert_eq!(row.summary, "Crash on start");
    assert_eq!(row.description, "Stack trace attached");
  }
}
