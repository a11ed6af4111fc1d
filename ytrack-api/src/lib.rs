//! # YouTrack API Client
//!
//! An async client for the YouTrack REST API: projects and their custom
//! fields, issue search and creation, commands, and release versions.
//!
//! The client authenticates with a permanent token, a user name and password
//! (session login), or not at all. A 403 answer triggers exactly one
//! re-authentication and one retry. List endpoints are exposed both as lazy
//! streams and as collected vectors.

mod client;
mod consts;
mod endpoints;
mod error;
mod pagination;
#[cfg(test)]
mod test_support;

pub mod auth;
pub mod models;
pub mod tracker;

// Re-export the client
pub use client::{YouTrackClient, canonical_api_url};
pub use endpoints::issues::release_query;
pub use error::{Result, YouTrackError};
// Re-export models
pub use models::{
  Authentication, CurrentUser, CustomFieldValue, CustomFields, Issue, IssueQuery, Project, ProjectCustomField, Version,
  VersionChange,
};
pub use tokio_util::sync::CancellationToken;
pub use tracker::IssueTracker;
