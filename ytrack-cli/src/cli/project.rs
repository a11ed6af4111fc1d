//! # Project Command
//!
//! Lists projects, the custom fields of a project, and the values a custom
//! field can take.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use futures::TryStreamExt;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use ytrack_api::Project;
use ytrack_core::output::print_info;

use crate::cli::GlobalArgs;
use crate::clients;

/// Command for browsing projects
#[derive(Args)]
pub struct ProjectArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: ProjectSubcommands,
}

/// Subcommands for the project command
#[derive(Subcommand)]
pub enum ProjectSubcommands {
  /// List the projects visible to you
  #[command(alias = "ls")]
  List,

  /// List the custom fields of a project
  Fields {
    /// Project name or short name
    #[arg(long, short = 'p')]
    project: Option<String>,
  },

  /// List the values of a custom field (e.g. the states of "State")
  Values {
    /// Custom field name
    #[arg(index = 1)]
    field: String,

    /// Project name or short name
    #[arg(long, short = 'p')]
    project: Option<String>,
  },
}

#[derive(Tabled)]
struct ProjectRow {
  #[tabled(rename = "Short name")]
  short_name: String,
  #[tabled(rename = "Name")]
  name: String,
  #[tabled(rename = "ID")]
  id: String,
}

impl From<Project> for ProjectRow {
  fn from(project: Project) -> Self {
    Self {
      short_name: project.short_name,
      name: project.name,
      id: project.id,
    }
  }
}

/// Handle the project command
pub(crate) fn handle_project_command(project: ProjectArgs, global: &GlobalArgs) -> Result<()> {
  let session = clients::connect(global)?;

  match project.subcommand {
    ProjectSubcommands::List => {
      let projects = session
        .block_on(session.client.list_projects())
        .context("Failed to list projects")?;

      if projects.is_empty() {
        print_info("No projects are visible with these credentials");
        return Ok(());
      }

      let rows: Vec<ProjectRow> = projects.into_iter().map(ProjectRow::from).collect();
      println!("{}", Table::new(rows).with(Style::sharp()));
      Ok(())
    }
    ProjectSubcommands::Fields { project } => {
      let project = session.project(project.as_deref())?;
      let names: Vec<String> = session
        .block_on(session.client.custom_field_names(&project).try_collect::<Vec<_>>())
        .with_context(|| format!("Failed to list custom fields of {project}"))?;

      print_lines(names, &format!("Project {project} has no custom fields"));
      Ok(())
    }
    ProjectSubcommands::Values { field, project } => {
      let project = session.project(project.as_deref())?;
      let values: Vec<String> = session
        .block_on(session.client.custom_field_values(&field, &project).try_collect::<Vec<_>>())
        .with_context(|| format!("Failed to list values of '{field}' in {project}"))?;

      print_lines(values, &format!("Field '{field}' has no values"));
      Ok(())
    }
  }
}

fn print_lines(lines: Vec<String>, empty_message: &str) {
  if lines.is_empty() {
    print_info(empty_message);
  }
  for line in lines {
    println!("{line}");
  }
}
