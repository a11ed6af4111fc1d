//! # YouTrack API Endpoints
//!
//! Endpoint implementations grouped by resource: projects and their custom
//! fields, issues, commands, version bundles and the current user.

pub mod commands;
pub mod issues;
pub mod projects;
pub mod users;
pub mod versions;
