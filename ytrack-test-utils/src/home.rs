//! HOME directory management for testing
//!
//! Credential lookups read `~/.netrc`, so tests that exercise them must run
//! against a throwaway HOME rather than the developer's own.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::env::EnvVarGuard;

/// Points HOME at a temporary directory until dropped
pub struct HomeEnvTestGuard {
  /// The temporary directory that will be used as HOME
  pub temp_dir: TempDir,
  _vars: EnvVarGuard,
}

impl Default for HomeEnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl HomeEnvTestGuard {
  /// Create a new test environment with a temporary HOME directory
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let mut vars = EnvVarGuard::new();
    vars.set("HOME", temp_dir.path());

    Self { temp_dir, _vars: vars }
  }

  /// Get the path to the temporary HOME directory
  pub fn home_dir(&self) -> &Path {
    self.temp_dir.path()
  }

  /// Get the path to a file in the temporary HOME directory
  pub fn home_path(&self, relative_path: &str) -> PathBuf {
    self.temp_dir.path().join(relative_path)
  }
}
