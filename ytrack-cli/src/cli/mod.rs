//! # Command Line Interface
//!
//! Defines the CLI structure and command handlers for the ytrack tool,
//! including subcommands for issues, release versions, projects, credentials
//! and configuration.

mod completion;
mod config;
mod creds;
pub mod issue;
mod project;
mod version;

use anyhow::Result;
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Args, Parser, Subcommand};
use ytrack_api::auth::CredentialOverrides;
use ytrack_core::consts::{ENV_YOUTRACK_PASSWORD, ENV_YOUTRACK_TOKEN, ENV_YOUTRACK_URL, ENV_YOUTRACK_USERNAME};
use ytrack_core::output::ColorMode;

/// Top-level CLI command for the ytrack tool
#[derive(Parser)]
#[command(name = "ytrack")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "A YouTrack client for release workflows")]
#[command(
  long_about = "ytrack talks to a JetBrains YouTrack server from the command line.\n\n\
        It creates and searches issues, applies YouTrack commands to batches of\n\
        issues, and keeps release versions in a project's version field up to date."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
#[command(subcommand_required(true))]
#[command(disable_help_subcommand = true)]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightBlue.on_default().bold().underline())
    .usage(AnsiColor::Blue.on_default().bold())
    .literal(AnsiColor::BrightBlue.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    global = true,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages, including every request URL\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// Controls when colored output is used
  #[arg(
    long,
    value_enum,
    ignore_case = true,
    global = true,
    default_value_t = ColorMode::Auto,
  )]
  pub colors: ColorMode,

  #[command(flatten)]
  pub global: GlobalArgs,

  /// Subcommands
  #[command(subcommand)]
  pub command: Commands,
}

/// Connection options shared by every subcommand
#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
  /// YouTrack server URL (e.g. https://example.myjetbrains.com/youtrack)
  #[arg(long, global = true, env = ENV_YOUTRACK_URL, value_name = "URL")]
  pub server: Option<String>,

  /// Permanent token; takes precedence over every other credential
  #[arg(long, global = true, env = ENV_YOUTRACK_TOKEN, hide_env_values = true, value_name = "TOKEN")]
  pub token: Option<String>,

  /// User name for session login
  #[arg(long, global = true, env = ENV_YOUTRACK_USERNAME, value_name = "USER")]
  pub username: Option<String>,

  /// Password for session login, usually taken from the environment
  #[arg(long, global = true, env = ENV_YOUTRACK_PASSWORD, hide = true, hide_env_values = true)]
  pub password: Option<String>,
}

impl GlobalArgs {
  pub fn credential_overrides(&self) -> CredentialOverrides {
    CredentialOverrides {
      token: self.token.clone(),
      username: self.username.clone(),
      password: self.password.clone(),
    }
  }
}

/// Subcommands for the ytrack tool
#[derive(Subcommand)]
pub enum Commands {
  /// Generate shell completions
  #[command(long_about = "Generates shell completion scripts for ytrack commands.\n\n\
            Supported shells include bash, zsh, fish, elvish and PowerShell.")]
  Completion(completion::CompletionArgs),

  /// Show or change ytrack settings
  #[command(long_about = "Show or change the ytrack configuration file.\n\n\
            The configuration holds the server URL, a default project, and the names\n\
            of the custom fields used for issue state, issue type and release versions.\n\
            Credentials are never stored here; see 'ytrack creds'.")]
  #[command(arg_required_else_help = true)]
  Config(config::ConfigArgs),

  /// Credential management
  #[command(long_about = "Check and set up YouTrack credentials.\n\n\
            Credentials are stored in your .netrc file under the server's host name.\n\
            Use the login 'token' to store a permanent token instead of a password.")]
  #[command(arg_required_else_help = true)]
  Creds(creds::CredsArgs),

  /// Create, search and update issues
  #[command(long_about = "Work with YouTrack issues.\n\n\
            Create issues, search them with YouTrack queries, and apply commands,\n\
            comments or state changes to batches of issues selected by ID or by query.")]
  #[command(alias = "i")]
  #[command(arg_required_else_help = true)]
  Issue(issue::IssueArgs),

  /// List projects and their custom fields
  #[command(long_about = "List the projects visible to you, the custom fields of a project,\n\
            and the values a custom field can take.")]
  #[command(alias = "p")]
  #[command(arg_required_else_help = true)]
  Project(project::ProjectArgs),

  /// Manage release versions
  #[command(long_about = "Manage the release versions stored in a project's version field.\n\n\
            'ensure' creates a version when it is missing and only updates its flags\n\
            when they differ, so it is safe to run on every build.")]
  #[command(alias = "v")]
  #[command(arg_required_else_help = true)]
  Version(version::VersionArgs),
}

pub fn handle_cli(cli: Cli) -> Result<()> {
  // Set global color override based on --colors argument
  cli.colors.apply();

  match cli.command {
    Commands::Completion(completion) => completion::handle_completion_command(completion),
    Commands::Config(config) => config::handle_config_command(config),
    Commands::Creds(creds) => creds::handle_creds_command(creds, &cli.global),
    Commands::Issue(issue) => issue::handle_issue_command(issue, &cli.global),
    Commands::Project(project) => project::handle_project_command(project, &cli.global),
    Commands::Version(version) => version::handle_version_command(version, &cli.global),
  }
}
