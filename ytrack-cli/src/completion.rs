//! # Shell Completion
//!
//! Generates shell completion scripts so ytrack subcommands and flags can be
//! tab-completed.

use std::io;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::Cli;

/// Generate shell completions for the specified shell
pub fn generate_completions(shell: clap_complete::Shell) -> Result<()> {
  let mut cmd = Cli::command();
  let app_name = cmd.get_name().to_string();

  generate(shell, &mut cmd, app_name, &mut io::stdout());

  Ok(())
}
