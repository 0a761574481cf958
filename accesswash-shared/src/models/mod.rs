//! Wire types exchanged with the portal backend
//!
//! These mirror the JSON bodies of the `/portal/*`, `/support/*` and `/core/*`
//! endpoints. Optional and defaulted fields are lenient on purpose so that a
//! backend adding or omitting a column does not break deserialization.
//!
//! # Models
//!
//! - `response`: The `{success, data, message, errors}` envelope and list pages
//! - `tenant`: Tenant branding and contact details
//! - `customer`: Customer identity, credentials, and auth tokens
//! - `service_request`: Support tickets, comments, and ratings
//! - `dashboard`: Dashboard aggregate
//! - `session`: Active login sessions

pub mod customer;
pub mod dashboard;
pub mod response;
pub mod service_request;
pub mod session;
pub mod tenant;
