//! # ytrack CLI Library
//!
//! Command modules for the ytrack command-line tool: issue search and
//! commands, release versions, projects, credentials and configuration.

pub mod cli;
pub mod clients;
pub mod completion;
