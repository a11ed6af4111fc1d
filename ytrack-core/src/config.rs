//! # Configuration Management
//!
//! Handles the ytrack configuration file and its directory, including XDG
//! base directory support. The configuration stores non-secret settings only:
//! the server URL, a default project, and the names of the custom fields used
//! for issue state, issue type, and release versions. Secrets live in `.netrc`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{APP_NAME, DEFAULT_STATUS_FIELD, DEFAULT_TYPE_FIELD, DEFAULT_VERSION_FIELD};

/// Names of the YouTrack custom fields ytrack reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
  /// Field holding an issue's state (e.g. "State")
  pub status: String,
  /// Field holding an issue's type (e.g. "Type")
  #[serde(rename = "type")]
  pub issue_type: String,
  /// Version field used for release mapping (e.g. "Fix version")
  pub version: String,
}

impl Default for FieldNames {
  fn default() -> Self {
    Self {
      status: DEFAULT_STATUS_FIELD.to_string(),
      issue_type: DEFAULT_TYPE_FIELD.to_string(),
      version: DEFAULT_VERSION_FIELD.to_string(),
    }
  }
}

/// Persistent ytrack settings stored in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YouTrackConfig {
  /// Base URL of the YouTrack server
  #[serde(skip_serializing_if = "Option::is_none")]
  pub server_url: Option<String>,
  /// Project used when a command does not name one
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_project: Option<String>,
  /// Custom field name mapping
  pub fields: FieldNames,
}

/// Represents the configuration directories for the ytrack application
#[derive(Debug, Clone)]
pub struct ConfigDirs {
  pub config_dir: PathBuf,
}

impl ConfigDirs {
  /// Create a new ConfigDirs instance
  pub fn new() -> Result<Self> {
    let proj_dirs = ProjectDirs::from("", "", APP_NAME).context("Failed to determine project directories")?;

    Ok(Self {
      config_dir: proj_dirs.config_dir().to_path_buf(),
    })
  }

  /// Get the config directory
  pub fn config_dir(&self) -> &PathBuf {
    &self.config_dir
  }

  /// Get the path to the configuration file
  pub fn config_path(&self) -> PathBuf {
    self.config_dir.join("config.toml")
  }

  /// Load the configuration from file or return the default
  pub fn load_config(&self) -> Result<YouTrackConfig> {
    let config_path = self.config_path();

    if !config_path.exists() {
      debug!("No config file at {}; using defaults", config_path.display());
      return Ok(YouTrackConfig::default());
    }

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

    toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", config_path.display()))
  }

  /// Save the configuration to file, creating the directory if needed
  pub fn save_config(&self, config: &YouTrackConfig) -> Result<()> {
    fs::create_dir_all(&self.config_dir)
      .with_context(|| format!("Failed to create config directory {}", self.config_dir.display()))?;

    let config_path = self.config_path();
    let content = toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;

    fs::write(&config_path, content).with_context(|| format!("Failed to write config to {}", config_path.display()))?;
    debug!("Saved config to {}", config_path.display());

    Ok(())
  }
}

/// Get the configuration directories
pub fn get_config_dirs() -> Result<ConfigDirs> {
  ConfigDirs::new()
}
