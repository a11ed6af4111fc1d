//! # ytrack Core Library
//!
//! Shared building blocks for the ytrack workspace: configuration directories
//! and the TOML config file, `.netrc` credential storage, server URL helpers,
//! and terminal output formatting. The API client and the CLI both depend on
//! this crate so credentials and settings are discovered the same way
//! everywhere.

pub mod config;
pub mod consts;
pub mod creds;
pub mod output;
pub mod url;

// Re-export main types for the client and the CLI
pub use config::{ConfigDirs, FieldNames, YouTrackConfig, get_config_dirs};
pub use creds::Credentials;
pub use output::{ColorMode, print_error, print_info, print_success, print_warning};
