//! # Credential Management
//!
//! Storage and retrieval of YouTrack credentials. Secrets are kept in the
//! user's `.netrc` file, keyed by the server host, so they stay out of the
//! ytrack configuration file.

pub mod netrc;

/// A login/password pair read from a credential store
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}
