//! Response envelopes
//!
//! Most portal endpoints wrap their payload:
//!
//! ```json
//! {
//!   "success": true,
//!   "data": { "...": "..." },
//!   "message": "Profile updated",
//!   "errors": { "email": ["Enter a valid email address."] }
//! }
//! ```
//!
//! List endpoints under `/support/` are either paginated (`{"results": [...]}`)
//! or a bare JSON array; [`Listing`] accepts both.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to list of messages, as returned by the backend validators
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Standard response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the backend considers the call successful
    #[serde(default)]
    pub success: bool,

    /// Payload
    pub data: Option<T>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,

    /// Field-level validation errors
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

impl<T> ApiResponse<T> {
    /// Builds a successful envelope around `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    /// Returns the payload if the envelope reports success and carries data
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }

    /// First field-level message, formatted as `field: message`
    pub fn first_field_error(&self) -> Option<String> {
        self.errors.as_ref().and_then(first_field_error)
    }
}

/// First message of a field error map, formatted as `field: message`
pub fn first_field_error(errors: &FieldErrors) -> Option<String> {
    errors.iter().find_map(|(field, messages)| {
        messages.first().map(|message| {
            if field == "non_field_errors" || field == "__all__" {
                message.clone()
            } else {
                format!("{}: {}", field, message)
            }
        })
    })
}

/// A list body that may or may not be paginated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Paginated page (`{"count": 2, "next": null, "results": [...]}`)
    Page {
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },

    /// Bare array
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Page { results, .. } => results,
            Listing::Items(items) => items,
        }
    }
}
