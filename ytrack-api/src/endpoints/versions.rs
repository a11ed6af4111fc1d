//! # Version Endpoints
//!
//! Release versions live in the bundle behind a project's version custom
//! field (usually "Fix version"). Ensuring a version is an idempotent upsert:
//! it creates the value when missing and only updates its `released` and
//! `archived` flags when they differ from what was asked for.

use std::pin::pin;

use futures::{Stream, TryStreamExt, stream};
use tracing::{debug, info};

use crate::client::{ApiRequest, YouTrackClient};
use crate::consts::VERSION_FIELD_TYPE;
use crate::error::{Result, YouTrackError};
use crate::models::{Version, VersionChange, VersionPayload};
use crate::pagination::Paginator;

const VERSION_FIELDS: &str = "id,name,released,archived";

fn values_path(project_id: &str, field_id: &str) -> String {
  format!("admin/projects/{project_id}/customFields/{field_id}/bundle/values")
}

impl YouTrackClient {
  /// Stream the names of a project's version fields
  pub fn version_fields<'a>(&'a self, project: &'a str) -> impl Stream<Item = Result<String>> + 'a {
    stream::once(async move {
      let resolved = self.find_project(project).await?;
      let names = self.project_fields(resolved.id).try_filter_map(|field| async move {
        if field.kind == VERSION_FIELD_TYPE {
          Ok(Some(field.name))
        } else {
          debug!("Skipping field '{}' of type {}", field.name, field.kind);
          Ok(None)
        }
      });
      Ok::<_, YouTrackError>(names)
    })
    .try_flatten()
  }

  /// Stream the versions in the bundle of the version field `field`
  pub fn versions<'a>(&'a self, field: &'a str, project: &'a str) -> impl Stream<Item = Result<Version>> + 'a {
    stream::once(async move {
      let resolved = self.find_project(project).await?;
      let definition = self.find_field(&resolved, field, Some(VERSION_FIELD_TYPE)).await?;
      Ok::<_, YouTrackError>(self.bundle_versions(values_path(&resolved.id, &definition.id)))
    })
    .try_flatten()
  }

  /// Collect the versions of the version field `field`
  pub async fn list_versions(&self, field: &str, project: &str) -> Result<Vec<Version>> {
    self.versions(field, project).try_collect().await
  }

  /// Make sure `version` exists in the bundle of `field`.
  ///
  /// A missing version is created with unspecified flags set to `false`. An
  /// existing one is updated only when a specified flag differs from its
  /// current value; unspecified flags keep their current values.
  pub async fn ensure_version(
    &self,
    field: &str,
    project: &str,
    version: &str,
    released: Option<bool>,
    archived: Option<bool>,
  ) -> Result<VersionChange> {
    let resolved = self.find_project(project).await?;
    let definition = self.find_field(&resolved, field, Some(VERSION_FIELD_TYPE)).await?;
    let path = values_path(&resolved.id, &definition.id);

    let existing = {
      let mut versions = pin!(self.bundle_versions(path.clone()));
      let mut found = None;
      while let Some(candidate) = versions.try_next().await? {
        if candidate.name == version {
          found = Some(candidate);
          break;
        }
      }
      found
    };

    let Some(current) = existing else {
      debug!("Version {version} not found in {field}; creating it");
      let payload = VersionPayload::new(None, version, released.unwrap_or(false), archived.unwrap_or(false));
      self.send_empty(&ApiRequest::post(path).json(&payload)?).await?;
      info!("Created version {version} in {} ({field})", resolved.name);
      return Ok(VersionChange::Created);
    };

    let wanted_released = released.unwrap_or(current.released);
    let wanted_archived = archived.unwrap_or(current.archived);
    if wanted_released == current.released && wanted_archived == current.archived {
      debug!("Version {version} already up to date; skipping update");
      return Ok(VersionChange::Unchanged);
    }

    debug!(
      "Updating version {version}: released {} -> {wanted_released}, archived {} -> {wanted_archived}",
      current.released, current.archived
    );
    let payload = VersionPayload::new(Some(&current.id), version, wanted_released, wanted_archived);
    self
      .send_empty(&ApiRequest::post(format!("{path}/{}", current.id)).json(&payload)?)
      .await?;
    info!("Updated version {version} in {} ({field})", resolved.name);
    Ok(VersionChange::Updated)
  }

  /// Mark `version` released and, when `archive` is set, archived
  pub async fn release_version(
    &self,
    field: &str,
    project: &str,
    version: &str,
    release: bool,
    archive: bool,
  ) -> Result<VersionChange> {
    self
      .ensure_version(field, project, version, Some(release), Some(archive))
      .await
  }

  fn bundle_versions(&self, path: String) -> impl Stream<Item = Result<Version>> + '_ {
    Paginator::new(self, path).query("fields", VERSION_FIELDS).items()
  }
}
