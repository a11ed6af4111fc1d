//! Environment variable management for testing
//!
//! [`EnvVarGuard`] sets or clears individual variables and restores them on
//! drop. [`EnvTestGuard`] builds on it to point the XDG base directories at a
//! per-test temporary directory, so configuration files never touch the real
//! user profile.

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use tempfile::TempDir;

/// Restores every variable it touched to its original value when dropped
#[derive(Debug, Default)]
pub struct EnvVarGuard {
  originals: HashMap<String, Option<OsString>>,
}

impl EnvVarGuard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key` to `value` for the lifetime of the guard
  pub fn set(&mut self, key: &str, value: impl Into<OsString>) -> &mut Self {
    self.remember(key);
    unsafe {
      env::set_var(key, value.into());
    }
    self
  }

  /// Remove `key` for the lifetime of the guard
  pub fn remove(&mut self, key: &str) -> &mut Self {
    self.remember(key);
    unsafe {
      env::remove_var(key);
    }
    self
  }

  fn remember(&mut self, key: &str) {
    // Only the first value seen is the one to restore
    self
      .originals
      .entry(key.to_string())
      .or_insert_with(|| env::var_os(key));
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    for (key, original) in self.originals.drain() {
      match original {
        Some(val) => unsafe {
          env::set_var(&key, val);
        },
        None => unsafe {
          env::remove_var(&key);
        },
      }
    }
  }
}

/// A test environment that overrides XDG directories to use a per-test
/// temporary directory
pub struct EnvTestGuard {
  /// The temporary directory that backs the XDG directories
  pub temp_dir: TempDir,
  _vars: EnvVarGuard,
}

impl Default for EnvTestGuard {
  fn default() -> Self {
    Self::new()
  }
}

impl EnvTestGuard {
  /// XDG environment variable names
  pub const XDG_CONFIG_HOME: &'static str = "XDG_CONFIG_HOME";
  pub const XDG_DATA_HOME: &'static str = "XDG_DATA_HOME";
  pub const XDG_CACHE_HOME: &'static str = "XDG_CACHE_HOME";

  /// Create a new test environment with overridden XDG directories
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let temp_path = temp_dir.path().to_path_buf();
    let mut vars = EnvVarGuard::new();

    for (key, sub_dir) in [
      (Self::XDG_CONFIG_HOME, "config"),
      (Self::XDG_DATA_HOME, "data"),
      (Self::XDG_CACHE_HOME, "cache"),
    ] {
      let dir = temp_path.join(sub_dir);
      std::fs::create_dir_all(&dir).expect("Failed to create XDG directory");
      vars.set(key, dir);
    }

    Self { temp_dir, _vars: vars }
  }

  /// Get the path to the XDG config directory
  pub fn config_dir(&self) -> PathBuf {
    self.temp_dir.path().join("config")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_env_var_guard_restores_values() {
    let key = "YTRACK_TEST_UTILS_GUARD";
    unsafe {
      env::set_var(key, "original");
    }

    {
      let mut guard = EnvVarGuard::new();
      guard.set(key, "first").set(key, "second");
      assert_eq!(env::var(key).unwrap(), "second");

      guard.remove(key);
      assert!(env::var(key).is_err());
    }

    assert_eq!(env::var(key).unwrap(), "original");
    unsafe {
      env::remove_var(key);
    }
  }
}
