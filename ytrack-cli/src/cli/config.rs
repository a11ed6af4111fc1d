//! # Config Command
//!
//! Shows and edits the ytrack configuration file.

use anyhow::Result;
use clap::{Args, Subcommand};
use ytrack_core::config::{YouTrackConfig, get_config_dirs};
use ytrack_core::output::{format_path, print_header, print_info, print_success};
use ytrack_core::url::ensure_url_scheme;

/// Command for the configuration file
#[derive(Args)]
pub struct ConfigArgs {
  /// The subcommand to execute
  #[command(subcommand)]
  pub subcommand: ConfigSubcommands,
}

/// Subcommands for the config command
#[derive(Subcommand)]
pub enum ConfigSubcommands {
  /// Print the current configuration
  Show,

  /// Change configuration values
  #[command(arg_required_else_help = true)]
  Set(SetArgs),
}

/// Values accepted by `config set`; only the given ones change
#[derive(Args, Debug, Default)]
pub struct SetArgs {
  /// YouTrack server URL to store
  #[arg(long, value_name = "URL")]
  pub server_url: Option<String>,

  /// Project used when a command does not name one
  #[arg(long = "project", value_name = "PROJECT")]
  pub default_project: Option<String>,

  /// Name of the state field
  #[arg(long, value_name = "FIELD")]
  pub status_field: Option<String>,

  /// Name of the type field
  #[arg(long, value_name = "FIELD")]
  pub type_field: Option<String>,

  /// Name of the version field used for releases
  #[arg(long, value_name = "FIELD")]
  pub version_field: Option<String>,
}

/// Handle the config command
pub(crate) fn handle_config_command(config: ConfigArgs) -> Result<()> {
  let dirs = get_config_dirs()?;

  match config.subcommand {
    ConfigSubcommands::Show => {
      let current = dirs.load_config()?;
      print_header("ytrack configuration");
      println!("  File: {}", format_path(&dirs.config_path().display().to_string()));
      print_config(&current);
      Ok(())
    }
    ConfigSubcommands::Set(args) => {
      let mut current = dirs.load_config()?;
      if !apply_settings(&mut current, args)? {
        print_info("Nothing to change");
        return Ok(());
      }
      dirs.save_config(&current)?;
      print_success(&format!(
        "Saved configuration to {}",
        format_path(&dirs.config_path().display().to_string())
      ));
      print_config(&current);
      Ok(())
    }
  }
}

fn print_config(config: &YouTrackConfig) {
  println!("  Server: {}", config.server_url.as_deref().unwrap_or("(not set)"));
  println!("  Default project: {}", config.default_project.as_deref().unwrap_or("(not set)"));
  println!("  State field: {}", config.fields.status);
  println!("  Type field: {}", config.fields.issue_type);
  println!("  Version field: {}", config.fields.version);
}

fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

/// Apply the given settings; returns whether anything was given
fn apply_settings(config: &mut YouTrackConfig, args: SetArgs) -> Result<bool> {
  let mut changed = false;

  if let Some(server) = non_blank(args.server_url) {
    config.server_url = Some(ensure_url_scheme(&server)?);
    changed = true;
  }
  if let Some(project) = non_blank(args.default_project) {
    config.default_project = Some(project);
    changed = true;
  }
  if let Some(field) = non_blank(args.status_field) {
    config.fields.status = field;
    changed = true;
  }
  if let Some(field) = non_blank(args.type_field) {
    config.fields.issue_type = field;
    changed = true;
  }
  if let Some(field) = non_blank(args.version_field) {
    config.fields.version = field;
    changed = true;
  }

  Ok(changed)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_apply_settings() {
    let mut config = YouTrackConfig::default();
    let args = SetArgs {
      server_url: Some("yt.example.com/youtrack".to_string()),
      version_field: Some(" Affected versions ".to_string()),
      default_project: Some("  ".to_string()),
      ..SetArgs::default()
    };

    assert!(apply_settings(&mut config, args).unwrap());
    assert_eq!(config.server_url.as_deref(), Some("https://yt.example.com/youtrack"));
    assert_eq!(config.fields.version, "Affected versions");
    assert_eq!(config.fields.status, "State");
    assert!(config.default_project.is_none());
  }

  #[test]
  fn test_apply_nothing() {
    let mut config = YouTrackConfig::default();

    assert!(!apply_settings(&mut config, SetArgs::default()).unwrap());
    assert_eq!(config, YouTrackConfig::default());
  }

  #[test]
  fn test_invalid_server_is_rejected() {
    let mut config = YouTrackConfig::default();
    let args = SetArgs {
      server_url: Some("https://".to_string()),
      ..SetArgs::default()
    };

    assert!(apply_settings(&mut config, args).is_err());
  }
}
