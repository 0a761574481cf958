//! # AccessWash Shared Library
//!
//! Shared types and client-side building blocks for the AccessWash customer
//! portal. Nothing in this crate performs network I/O.
//!
//! ## Module Organization
//!
//! - `models`: Wire types exchanged with the portal backend
//! - `tenant`: Tenant slug resolution from hosts and paths
//! - `storage`: Tenant-namespaced session persistence
//! - `validation`: Client-side checks run before a request is sent

pub mod models;
pub mod storage;
pub mod tenant;
pub mod validation;

/// Current version of the AccessWash shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
