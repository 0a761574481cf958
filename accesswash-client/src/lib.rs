//! # AccessWash Portal Client
//!
//! Client library for the AccessWash customer portal. Each water utility is
//! a tenant with its own backend at `{tenant}.accesswash.org`; this crate
//! picks the right backend, keeps one session per tenant, and exposes the
//! portal's account and service request operations.
//!
//! ## Modules
//!
//! - `api`: Per-tenant API client with bearer injection and 401 handling
//! - `config`: Configuration management
//! - `controller`: Authentication state and portal actions
//! - `error`: Error taxonomy and message normalization
//! - `navigation`: Redirect sink and route guard

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod navigation;

pub use api::{ApiClient, ApiClients};
pub use config::ClientConfig;
pub use controller::{AuthController, AuthState};
pub use error::{ClientError, ClientResult};
