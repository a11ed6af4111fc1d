//! # Client Creation
//!
//! Centralized construction of the YouTrack client for CLI commands: loads
//! the configuration, resolves the server URL and credentials, and wires
//! Ctrl-C to the client's cancellation token.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::BaseDirs;
use tokio::runtime::Runtime;
use tracing::debug;
use ytrack_api::auth::create_youtrack_runtime_and_client;
use ytrack_api::{CancellationToken, YouTrackClient};
use ytrack_core::config::{YouTrackConfig, get_config_dirs};
use ytrack_core::url::resolve_server_url;

use crate::cli::GlobalArgs;

/// A configured client together with the runtime that drives it
pub struct Session {
  pub rt: Runtime,
  pub client: YouTrackClient,
  pub config: YouTrackConfig,
  cancel: CancellationToken,
}

impl Session {
  /// Run `future` to completion, cancelling the client on Ctrl-C.
  ///
  /// Reads in flight are abandoned; writes in flight still complete.
  pub fn block_on<F: Future>(&self, future: F) -> F::Output {
    let cancel = self.cancel.clone();
    self.rt.block_on(async move {
      let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
          debug!("Interrupted; cancelling outstanding requests");
          cancel.cancel();
        }
      });
      let output = future.await;
      watcher.abort();
      output
    })
  }

  /// The explicit project, else the configured default project
  pub fn project(&self, explicit: Option<&str>) -> Result<String> {
    resolve_project(explicit, &self.config)
  }
}

/// Get the user's home directory
pub fn home_dir() -> Result<PathBuf> {
  let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
  Ok(base_dirs.home_dir().to_path_buf())
}

/// Load the configuration file, or defaults when there is none
pub fn load_config() -> Result<YouTrackConfig> {
  get_config_dirs()?.load_config()
}

/// Pick the project for a command from a flag or the configured default
pub fn resolve_project(explicit: Option<&str>, config: &YouTrackConfig) -> Result<String> {
  explicit
    .filter(|project| !project.trim().is_empty())
    .or(config.default_project.as_deref())
    .map(str::to_string)
    .context("No project given. Pass --project or run 'ytrack config set --project <name>'.")
}

/// Creates a runtime and an authenticated YouTrack client for a command
pub fn connect(global: &GlobalArgs) -> Result<Session> {
  let config = load_config()?;
  let server_url = resolve_server_url(global.server.as_deref(), &config)?;
  let home = home_dir()?;

  let (rt, client) = create_youtrack_runtime_and_client(&home, &server_url, &global.credential_overrides())?;
  let cancel = CancellationToken::new();
  let mut client = client.with_cancellation(cancel.clone());
  if let Some(project) = &config.default_project {
    client = client.with_default_project(project.clone());
  }

  Ok(Session {
    rt,
    client,
    config,
    cancel,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_resolve_project() {
    let config = YouTrackConfig {
      default_project: Some("DEMO".to_string()),
      ..YouTrackConfig::default()
    };

    assert_eq!(resolve_project(Some("OTHER"), &config).unwrap(), "OTHER");
    assert_eq!(resolve_project(Some(""), &config).unwrap(), "DEMO");
    assert_eq!(resolve_project(None, &config).unwrap(), "DEMO");

    let error = resolve_project(None, &YouTrackConfig::default())
      .unwrap_err()
      .to_string();
    assert!(error.contains("--project"));
  }
}
