//! # Project Endpoints
//!
//! Project listing and lookup, plus the custom fields attached to a project
//! and the values of their bundles.

use std::pin::pin;

use futures::{Stream, TryStreamExt, stream};
use tracing::debug;

use crate::client::YouTrackClient;
use crate::error::{Result, YouTrackError};
use crate::models::{Project, ProjectCustomField, RawBundleValue, RawProject, RawProjectCustomField};
use crate::pagination::Paginator;

const PROJECT_FIELDS: &str = "id,name,shortName";
const PROJECT_CUSTOM_FIELD_FIELDS: &str = "id,$type,field(name)";

impl YouTrackClient {
  /// Stream all projects visible to the current user
  pub fn projects(&self) -> impl Stream<Item = Result<Project>> + '_ {
    Paginator::new(self, "admin/projects")
      .query("fields", PROJECT_FIELDS)
      .decode(RawProject::into_project)
  }

  /// List all projects visible to the current user
  pub async fn list_projects(&self) -> Result<Vec<Project>> {
    self.projects().try_collect().await
  }

  /// Find a project by name or short name.
  ///
  /// The full project list is fetched on every call.
  pub async fn find_project(&self, name: &str) -> Result<Project> {
    debug!("Resolving project '{name}'");

    let mut projects = pin!(self.projects());
    while let Some(project) = projects.try_next().await? {
      if project.matches(name) {
        debug!("Project '{name}' resolved to {}", project.id);
        return Ok(project);
      }
    }

    Err(YouTrackError::ProjectNotFound(name.to_string()))
  }

  /// Resolve `project`, falling back to the client's default project
  pub(crate) async fn project_or_default(&self, project: Option<&str>) -> Result<Project> {
    let name = project
      .filter(|name| !name.trim().is_empty())
      .or(self.default_project.as_deref())
      .ok_or(YouTrackError::MissingProject)?;
    self.find_project(name).await
  }

  pub(crate) fn project_fields(&self, project_id: String) -> impl Stream<Item = Result<ProjectCustomField>> + '_ {
    Paginator::new(self, format!("admin/projects/{project_id}/customFields"))
      .query("fields", PROJECT_CUSTOM_FIELD_FIELDS)
      .decode(RawProjectCustomField::into_field)
  }

  /// Find a project custom field by name, ignoring case. When `kind` is
  /// given the field must also have that `$type`.
  pub(crate) async fn find_field(
    &self,
    project: &Project,
    field: &str,
    kind: Option<&str>,
  ) -> Result<ProjectCustomField> {
    debug!("Resolving field '{field}' in project {}", project.name);

    let mut fields = pin!(self.project_fields(project.id.clone()));
    while let Some(candidate) = fields.try_next().await? {
      if !candidate.name.eq_ignore_ascii_case(field) {
        continue;
      }
      match kind {
        Some(kind) if candidate.kind != kind => {
          debug!("Field '{}' is a {}, not a {kind}", candidate.name, candidate.kind);
        }
        _ => return Ok(candidate),
      }
    }

    Err(YouTrackError::FieldNotFound {
      field: field.to_string(),
      project: project.name.clone(),
    })
  }

  /// Stream the names of all custom fields of a project
  pub fn custom_field_names<'a>(&'a self, project: &'a str) -> impl Stream<Item = Result<String>> + 'a {
    stream::once(async move {
      let resolved = self.find_project(project).await?;
      Ok::<_, YouTrackError>(self.project_fields(resolved.id).map_ok(|field| field.name))
    })
    .try_flatten()
  }

  /// Stream the value names of a custom field's bundle, e.g. the states of
  /// a state field
  pub fn custom_field_values<'a>(
    &'a self,
    field: &'a str,
    project: &'a str,
  ) -> impl Stream<Item = Result<String>> + 'a {
    stream::once(async move {
      let resolved = self.find_project(project).await?;
      let definition = self.find_field(&resolved, field, None).await?;
      let values = Paginator::new(
        self,
        format!("admin/projects/{}/customFields/{}/bundle/values", resolved.id, definition.id),
      )
      .query("fields", "id,name")
      .decode(|value: RawBundleValue| value.name.filter(|name| !name.is_empty()));
      Ok::<_, YouTrackError>(values)
    })
    .try_flatten()
  }
}
