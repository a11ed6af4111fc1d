//! # ytrack CLI Entry Point
//!
//! The main entry point for the ytrack command-line tool, a YouTrack client
//! for release workflows.

use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};
use ytrack_cli::cli::{self, handle_cli};

fn main() -> Result<()> {
  // Parse CLI arguments using the derive-based implementation
  let cmd = cli::Cli::parse();

  // Set up tracing based on verbosity level
  let level = match cmd.verbose {
    0 => tracing::Level::WARN,  // Default: warnings and errors
    1 => tracing::Level::INFO,  // -v: info, warnings, and errors
    2 => tracing::Level::DEBUG, // -vv: debug, including request URLs
    _ => tracing::Level::TRACE, // -vvv or more: everything
  };

  // Logs go to stderr so command output stays pipeable
  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);

  handle_cli(cmd)
}
