//! Temporary `.netrc` fixtures

use std::fs;
use std::path::Path;

use crate::home::HomeEnvTestGuard;

/// RAII guard for test .netrc files
///
/// Creates a temporary HOME holding a `.netrc` with the given content. HOME is
/// restored when the guard is dropped.
pub struct NetrcGuard {
  home: HomeEnvTestGuard,
}

impl NetrcGuard {
  /// Create a new NetrcGuard with the given content
  pub fn new(content: &str) -> Self {
    let home = HomeEnvTestGuard::new();
    let netrc_path = home.home_path(".netrc");
    fs::write(&netrc_path, content).expect("Failed to write test .netrc");

    Self { home }
  }

  /// Get the path to the temporary HOME directory
  pub fn home_dir(&self) -> &Path {
    self.home.home_dir()
  }
}
