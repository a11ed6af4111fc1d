//! URL helpers shared across crates.
//!
//! These live in `ytrack-core` so both the CLI and the API client resolve the
//! YouTrack server address the same way, without depending on a client
//! instance.

use anyhow::{Context, Result};
use url::Url;

use crate::config::YouTrackConfig;
use crate::consts::ENV_YOUTRACK_URL;

/// Ensure a server URL has a scheme, assuming `https://` when it is missing.
///
/// The path is kept as given; YouTrack instances are often hosted under a
/// sub-path such as `/youtrack`.
pub fn ensure_url_scheme(input: &str) -> Result<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(anyhow::anyhow!("Server URL cannot be empty"));
  }

  let candidate = if trimmed.contains("://") {
    trimmed.to_string()
  } else {
    format!("https://{trimmed}")
  };

  let url = Url::parse(&candidate).with_context(|| format!("Failed to parse server URL: '{input}'"))?;
  if url.host_str().is_none() {
    return Err(anyhow::anyhow!("Server URL '{input}' has no host"));
  }

  Ok(candidate)
}

/// Resolve the server URL from an explicit value (flag or environment) or the
/// configuration file, in that order.
pub fn resolve_server_url(explicit: Option<&str>, config: &YouTrackConfig) -> Result<String> {
  let raw = explicit
    .filter(|value| !value.trim().is_empty())
    .or(config.server_url.as_deref())
    .ok_or_else(|| {
      anyhow::anyhow!(
        "YouTrack server URL not configured. Pass --server, set ${ENV_YOUTRACK_URL}, or run 'ytrack config set --server-url <url>'."
      )
    })?;

  ensure_url_scheme(raw)
}

/// Extract the `host[:port]` part of a server URL, used as the `.netrc`
/// machine name.
pub fn server_host(server_url: &str) -> Result<String> {
  let url = Url::parse(&ensure_url_scheme(server_url)?).context("Failed to parse server URL")?;
  let host = url.host_str().context("Server URL has no host")?;

  Ok(match url.port() {
    Some(port) => format!("{host}:{port}"),
    None => host.to_string(),
  })
}
