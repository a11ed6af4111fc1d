//! Helpers for reading and writing credentials stored in `.netrc` files.
//!
//! Both the single-line (`machine host login user password pass`) and the
//! multi-line layouts are understood. Writing replaces the entry for a machine
//! in place or appends a new one, and tightens permissions to `600` on Unix.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::creds::Credentials;

/// Returns the path to the `.netrc` file for the provided home directory.
///
/// ```
/// use std::path::Path;
/// use ytrack_core::creds::netrc::get_netrc_path;
///
/// let path = get_netrc_path(Path::new("/home/user"));
/// assert_eq!(path, Path::new("/home/user/.netrc"));
/// ```
pub fn get_netrc_path(home: &Path) -> PathBuf {
  home.join(".netrc")
}

/// Parses a `.netrc` file and returns credentials for the requested machine.
///
/// Returns `Ok(None)` when the machine is absent or its entry lacks a `login`
/// or `password` value.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn parse_netrc_file(path: &Path, target_machine: &str) -> Result<Option<Credentials>> {
  let content = fs::read_to_string(path).context("Failed to read .netrc file")?;
  Ok(parse_netrc(&content, target_machine))
}

/// Splits `.netrc` content into whitespace-separated tokens with their byte
/// offsets.
fn tokenize(content: &str) -> Vec<(usize, &str)> {
  content
    .split_whitespace()
    .map(|token| (token.as_ptr() as usize - content.as_ptr() as usize, token))
    .collect()
}

fn starts_entry(token: &str) -> bool {
  token == "machine" || token == "default"
}

fn parse_netrc(content: &str, target_machine: &str) -> Option<Credentials> {
  let mut tokens = tokenize(content).into_iter().map(|(_, token)| token);
  let mut in_target = false;
  let mut username: Option<&str> = None;
  let mut password: Option<&str> = None;

  while let Some(token) = tokens.next() {
    match token {
      "machine" | "default" => {
        if in_target {
          break;
        }
        let machine = if token == "machine" { tokens.next() } else { None };
        in_target = machine == Some(target_machine);
        username = None;
        password = None;
      }
      "login" => username = tokens.next(),
      "password" => password = tokens.next(),
      _ => {}
    }
  }

  match (in_target, username, password) {
    (true, Some(username), Some(password)) => Some(Credentials {
      username: username.to_string(),
      password: password.to_string(),
    }),
    _ => None,
  }
}

/// Byte range of the entry for `machine`, from its `machine` token up to the
/// next `machine` or `default` token.
fn entry_span(tokens: &[(usize, &str)], content_len: usize, machine: &str) -> Option<Range<usize>> {
  let start = tokens
    .windows(2)
    .position(|pair| pair[0].1 == "machine" && pair[1].1 == machine)?;
  let end = tokens[start + 2..]
    .iter()
    .find(|(_, token)| starts_entry(token))
    .map_or(content_len, |(offset, _)| *offset);
  Some(tokens[start].0..end)
}

/// Looks up credentials for `machine` in the `.netrc` under `home`.
///
/// A missing `.netrc` file is not an error.
pub fn find_credentials(home: &Path, machine: &str) -> Result<Option<Credentials>> {
  let netrc_path = get_netrc_path(home);
  if !netrc_path.exists() {
    debug!("No .netrc file at {}", netrc_path.display());
    return Ok(None);
  }

  let credentials = parse_netrc_file(&netrc_path, machine)?;
  debug!(
    "{} .netrc entry for machine '{machine}'",
    if credentials.is_some() { "Found" } else { "No" }
  );
  Ok(credentials)
}

/// Writes or updates a `.netrc` entry for the given machine.
///
/// # Errors
///
/// Returns an error if the file cannot be read from or written to, or if
/// permissions cannot be set.
pub fn write_netrc_entry(path: &Path, machine: &str, username: &str, password: &str) -> Result<()> {
  let existing = if path.exists() {
    fs::read_to_string(path).context("Failed to read existing .netrc file")?
  } else {
    String::new()
  };

  let entry = format!("machine {machine}\n  login {username}\n  password {password}\n");
  let tokens = tokenize(&existing);
  let mut content = String::with_capacity(existing.len() + entry.len() + 1);

  if let Some(span) = entry_span(&tokens, existing.len(), machine) {
    let rest = &existing[span.end..];
    content.push_str(&existing[..span.start]);
    content.push_str(&entry);
    if !rest.is_empty() {
      content.push('\n');
      content.push_str(rest);
    }
  } else {
    // `default` has to stay last
    let insert_at = tokens
      .iter()
      .find(|(_, token)| *token == "default")
      .map_or(existing.len(), |(offset, _)| *offset);
    let (before, after) = existing.split_at(insert_at);
    content.push_str(before);
    if !before.is_empty() {
      if !before.ends_with('\n') {
        content.push('\n');
      }
      if !before.ends_with("\n\n") {
        content.push('\n');
      }
    }
    content.push_str(&entry);
    if !after.is_empty() {
      content.push('\n');
      content.push_str(after);
    }
  }

  fs::write(path, content).context("Failed to write .netrc file")?;
  set_secure_permissions(path)?;

  Ok(())
}

/// Returns true when the file is readable by group or others.
#[cfg(unix)]
pub fn has_insecure_permissions(path: &Path) -> Result<bool> {
  use std::os::unix::fs::PermissionsExt;

  let mode = fs::metadata(path).context("Failed to read .netrc metadata")?.permissions().mode();
  Ok(mode & 0o077 != 0)
}

/// Returns true when the file is readable by group or others.
#[cfg(not(unix))]
pub fn has_insecure_permissions(_path: &Path) -> Result<bool> {
  Ok(false)
}

#[cfg(unix)]
fn set_secure_permissions(path: &Path) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  fs::set_permissions(path, fs::Permissions::from_mode(0o600)).context("Failed to set .netrc permissions")
}

#[cfg(not(unix))]
fn set_secure_permissions(_path: &Path) -> Result<()> {
  Ok(())
}
