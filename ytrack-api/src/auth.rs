//! Authentication helpers for the YouTrack client.
//!
//! These helpers centralize credential lookup and runtime construction so the
//! CLI resolves credentials in one place, in this order:
//!
//! 1. an explicit token (`--token` or `$YOUTRACK_TOKEN`)
//! 2. an explicit user name, with the password from `$YOUTRACK_PASSWORD` or
//!    the `.netrc` entry for the server host
//! 3. the `.netrc` entry for the server host, where the login `token` marks
//!    the password as a permanent token
//! 4. anonymous access

use std::path::Path;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;
use tracing::debug;
use ytrack_core::consts::{ENV_YOUTRACK_PASSWORD, NETRC_TOKEN_LOGIN};
use ytrack_core::creds::netrc::find_credentials;
use ytrack_core::url::server_host;

use crate::client::YouTrackClient;
use crate::models::Authentication;

/// Credentials given on the command line or through the environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialOverrides {
  pub token: Option<String>,
  pub username: Option<String>,
  pub password: Option<String>,
}

impl std::fmt::Debug for CredentialOverrides {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CredentialOverrides")
      .field("token", &self.token.as_ref().map(|_| "<redacted>"))
      .field("username", &self.username)
      .field("password", &self.password.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

fn present(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|value| !value.trim().is_empty())
}

/// Decide how to authenticate against `server_url`.
pub fn resolve_authentication(home: &Path, server_url: &str, overrides: &CredentialOverrides) -> Result<Authentication> {
  if let Some(token) = present(&overrides.token) {
    debug!("Using the permanent token given explicitly");
    return Ok(Authentication::resolve(Some(token), None, None));
  }

  let host = server_host(server_url)?;
  let stored = find_credentials(home, &host)?;

  if let Some(username) = present(&overrides.username) {
    let password = match present(&overrides.password) {
      Some(password) => password.to_string(),
      None => stored
        .filter(|creds| creds.username == username)
        .map(|creds| creds.password)
        .with_context(|| {
          format!(
            "No password for user '{username}'. Set ${ENV_YOUTRACK_PASSWORD} or add it to .netrc for machine '{host}'."
          )
        })?,
    };
    return Ok(Authentication::resolve(None, Some(username), Some(&password)));
  }

  Ok(match stored {
    Some(creds) if creds.username == NETRC_TOKEN_LOGIN => {
      debug!("Using the permanent token stored in .netrc for {host}");
      Authentication::resolve(Some(&creds.password), None, None)
    }
    Some(creds) => {
      debug!("Using the .netrc login for {host}");
      Authentication::resolve(None, Some(&creds.username), Some(&creds.password))
    }
    None => {
      debug!("No credentials for {host}; using anonymous access");
      Authentication::Anonymous
    }
  })
}

/// Check whether credentials for the server are stored in `.netrc`.
pub fn check_youtrack_credentials(home: &Path, server_url: &str) -> Result<bool> {
  Ok(find_credentials(home, &server_host(server_url)?)?.is_some())
}

/// Creates a YouTrack client authenticated with the resolved credentials.
pub fn create_youtrack_client(
  home: &Path,
  server_url: &str,
  overrides: &CredentialOverrides,
) -> Result<YouTrackClient> {
  let auth = resolve_authentication(home, server_url, overrides).context("Failed to resolve credentials")?;
  YouTrackClient::new(server_url, auth).context("Failed to create YouTrack client")
}

/// Creates a tokio runtime and an authenticated YouTrack client.
pub fn create_youtrack_runtime_and_client(
  home: &Path,
  server_url: &str,
  overrides: &CredentialOverrides,
) -> Result<(Runtime, YouTrackClient)> {
  let rt = Runtime::new().context("Failed to create async runtime")?;
  let client = create_youtrack_client(home, server_url, overrides)?;
  Ok((rt, client))
}

#[cfg(test)]
mod tests {
  use serial_test::serial;
  use ytrack_test_utils::NetrcGuard;

  use super::*;

  const SERVER: &str = "https://yt.example.com/youtrack";

  fn netrc() -> NetrcGuard {
    NetrcGuard::new(
      r#"machine yt.example.com
  login alice
  password secret

machine tokens.example.com
  login token
  password perm:stored
"#,
    )
  }

  #[test]
  #[serial]
  fn test_explicit_token_wins() {
    let guard = netrc();
    let overrides = CredentialOverrides {
      token: Some("perm:flag".to_string()),
      username: Some("bob".to_string()),
      password: Some("hunter2".to_string()),
    };

    let auth = resolve_authentication(guard.home_dir(), SERVER, &overrides).unwrap();
    assert_eq!(auth, Authentication::Token("perm:flag".to_string()));
  }

  #[test]
  #[serial]
  fn test_username_with_explicit_password() {
    let guard = netrc();
    let overrides = CredentialOverrides {
      token: Some(String::new()),
      username: Some("bob".to_string()),
      password: Some("hunter2".to_string()),
    };

    let auth = resolve_authentication(guard.home_dir(), SERVER, &overrides).unwrap();
    assert_eq!(
      auth,
      Authentication::Password {
        username: "bob".to_string(),
        password: "hunter2".to_string(),
      }
    );
  }

  #[test]
  #[serial]
  fn test_username_with_netrc_password() {
    let guard = netrc();
    let overrides = CredentialOverrides {
      username: Some("alice".to_string()),
      ..CredentialOverrides::default()
    };

    let auth = resolve_authentication(guard.home_dir(), SERVER, &overrides).unwrap();
    assert_eq!(
      auth,
      Authentication::Password {
        username: "alice".to_string(),
        password: "secret".to_string(),
      }
    );
  }

  #[test]
  #[serial]
  fn test_username_without_password() {
    let guard = netrc();
    let overrides = CredentialOverrides {
      username: Some("bob".to_string()),
      ..CredentialOverrides::default()
    };

    let error = resolve_authentication(guard.home_dir(), SERVER, &overrides)
      .unwrap_err()
      .to_string();
    assert!(error.contains(ENV_YOUTRACK_PASSWORD));
    assert!(error.contains("yt.example.com"));
  }

  #[test]
  #[serial]
  fn test_netrc_login_and_token_entries() {
    let guard = netrc();
    let none = CredentialOverrides::default();

    assert_eq!(
      resolve_authentication(guard.home_dir(), SERVER, &none).unwrap(),
      Authentication::Password {
        username: "alice".to_string(),
        password: "secret".to_string(),
      }
    );
    assert_eq!(
      resolve_authentication(guard.home_dir(), "tokens.example.com", &none).unwrap(),
      Authentication::Token("perm:stored".to_string())
    );
    assert_eq!(
      resolve_authentication(guard.home_dir(), "https://elsewhere.example.com", &none).unwrap(),
      Authentication::Anonymous
    );
  }

  #[test]
  #[serial]
  fn test_check_youtrack_credentials() {
    let guard = netrc();

    assert!(check_youtrack_credentials(guard.home_dir(), SERVER).unwrap());
    assert!(!check_youtrack_credentials(guard.home_dir(), "https://elsewhere.example.com").unwrap());
  }

  #[test]
  #[serial]
  fn test_create_client_uses_resolved_credentials() {
    let guard = netrc();

    let client = create_youtrack_client(guard.home_dir(), SERVER, &CredentialOverrides::default()).unwrap();
    assert_eq!(client.api_url(), "https://yt.example.com/youtrack/api/");
    assert!(matches!(client.authentication(), Authentication::Password { .. }));
  }
}
