//! Test utilities shared across the ytrack workspace
//!
//! This crate provides RAII guards that isolate process-wide state during
//! tests:
//! - XDG directory mocking ([`EnvTestGuard`])
//! - Arbitrary environment variables ([`EnvVarGuard`])
//! - HOME directory isolation ([`HomeEnvTestGuard`])
//! - Throwaway `.netrc` files ([`NetrcGuard`])
//!
//! Every guard mutates the process environment, so tests using them should
//! be marked `#[serial]`.

#![allow(dead_code)]

pub mod env;
pub mod home;
pub mod netrc;

// Re-export commonly used items
pub use env::{EnvTestGuard, EnvVarGuard};
pub use home::HomeEnvTestGuard;
pub use netrc::NetrcGuard;
