//! # Version Command
//!
//! Derive-based implementation of the version command for managing release
//! versions in a project's version field.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use futures::TryStreamExt;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use ytrack_api::{Version, VersionChange};
use ytrack_core::output::{print_info, print_success};

use crate::cli::GlobalArgs;
use crate::clients::{self, Session};

/// Command for managing release versions
#[derive(Args)]
pub struct VersionArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: VersionSubcommands,
}

/// Where a version lives: a project and one of its version fields
#[derive(Args, Debug, Clone, Default)]
pub struct VersionTarget {
  /// Project name or short name
  #[arg(long, short = 'p')]
  pub project: Option<String>,

  /// Version field name (defaults to the configured version field)
  #[arg(long, short = 'f')]
  pub field: Option<String>,
}

/// Subcommands for the version command
#[derive(Subcommand)]
pub enum VersionSubcommands {
  /// Create a version or bring its flags up to date
  #[command(long_about = "Make sure a version exists in the version field.\n\n\
                         A missing version is created; flags not given default to false.\n\
                         An existing version is only updated when a given flag differs,\n\
                         so running the same command twice changes nothing the second time.")]
  Ensure {
    /// Version name (e.g. 1.2.0)
    #[arg(index = 1, value_name = "VERSION")]
    name: String,

    #[command(flatten)]
    target: VersionTarget,

    /// Whether the version is released
    #[arg(long, value_name = "BOOL")]
    released: Option<bool>,

    /// Whether the version is archived
    #[arg(long, value_name = "BOOL")]
    archived: Option<bool>,
  },

  /// Mark a version released and archived
  #[command(long_about = "Mark a version released and, unless --no-archive is given, archived.\n\n\
                         The version is created first when it does not exist.")]
  Release {
    /// Version name (e.g. 1.2.0)
    #[arg(index = 1, value_name = "VERSION")]
    name: String,

    #[command(flatten)]
    target: VersionTarget,

    /// Keep the version unarchived
    #[arg(long)]
    no_archive: bool,
  },

  /// List the versions of a version field
  #[command(alias = "ls")]
  List {
    #[command(flatten)]
    target: VersionTarget,
  },

  /// List the version fields of a project
  Fields {
    /// Project name or short name
    #[arg(long, short = 'p')]
    project: Option<String>,
  },
}

#[derive(Tabled)]
struct VersionRow {
  #[tabled(rename = "Version")]
  name: String,
  #[tabled(rename = "Released")]
  released: String,
  #[tabled(rename = "Archived")]
  archived: String,
}

fn yes_no(flag: bool) -> String {
  if flag { "yes" } else { "no" }.to_string()
}

impl From<&Version> for VersionRow {
  fn from(version: &Version) -> Self {
    Self {
      name: version.name.clone(),
      released: yes_no(version.released),
      archived: yes_no(version.archived),
    }
  }
}

/// Handle the version command
pub(crate) fn handle_version_command(version: VersionArgs, global: &GlobalArgs) -> Result<()> {
  let session = clients::connect(global)?;

  match version.subcommand {
    VersionSubcommands::Ensure {
      name,
      target,
      released,
      archived,
    } => {
      let (project, field) = resolve_target(&session, &target)?;
      let change = session
        .block_on(
          session
            .client
            .ensure_version(&field, &project, &name, released, archived),
        )
        .with_context(|| format!("Failed to ensure version '{name}' in {project} ({field})"))?;
      report_change(&name, &project, change);
      Ok(())
    }
    VersionSubcommands::Release {
      name,
      target,
      no_archive,
    } => {
      let (project, field) = resolve_target(&session, &target)?;
      let change = session
        .block_on(
          session
            .client
            .release_version(&field, &project, &name, true, !no_archive),
        )
        .with_context(|| format!("Failed to release version '{name}' in {project} ({field})"))?;
      report_change(&name, &project, change);
      Ok(())
    }
    VersionSubcommands::List { target } => handle_list_command(&session, &target),
    VersionSubcommands::Fields { project } => {
      let project = session.project(project.as_deref())?;
      let fields: Vec<String> = session
        .block_on(session.client.version_fields(&project).try_collect::<Vec<_>>())
        .with_context(|| format!("Failed to list version fields of {project}"))?;

      if fields.is_empty() {
        print_info(&format!("Project {project} has no version fields"));
      }
      for field in fields {
        println!("{field}");
      }
      Ok(())
    }
  }
}

fn resolve_target(session: &Session, target: &VersionTarget) -> Result<(String, String)> {
  let project = session.project(target.project.as_deref())?;
  let field = target
    .field
    .clone()
    .filter(|field| !field.trim().is_empty())
    .unwrap_or_else(|| session.config.fields.version.clone());
  Ok((project, field))
}

fn report_change(version: &str, project: &str, change: VersionChange) {
  match change {
    VersionChange::Created => print_success(&format!("Created version {version} in {project}")),
    VersionChange::Updated => print_success(&format!("Updated version {version} in {project}")),
    VersionChange::Unchanged => print_info(&format!("Version {version} in {project} is already up to date")),
  }
}

fn handle_list_command(session: &Session, target: &VersionTarget) -> Result<()> {
  let (project, field) = resolve_target(session, target)?;
  let versions = session
    .block_on(session.client.list_versions(&field, &project))
    .with_context(|| format!("Failed to list versions of {project} ({field})"))?;

  if versions.is_empty() {
    print_info(&format!("No versions in {project} ({field})"));
    return Ok(());
  }

  let rows: Vec<VersionRow> = versions.iter().map(VersionRow::from).collect();
  println!("{}", Table::new(rows).with(Style::sharp()));
  Ok(())
}
