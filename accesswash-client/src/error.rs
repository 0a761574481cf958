//! Error handling for the portal client
//!
//! Every failure a caller can see is a [`ClientError`]. Whatever the cause,
//! its `Display` output is a single human-readable message suitable for
//! showing next to a form; no structured codes reach the UI.
//!
//! # Message selection
//!
//! For HTTP error responses the message is chosen in this order:
//!
//! 1. `detail` field of the body
//! 2. `message` field of the body
//! 3. First field-level validation message (`errors` map, or a bare
//!    `{"field": ["..."]}` body on 400)
//! 4. The operation's fallback ("Login failed", "Failed to load dashboard")
//!
//! Transport failures (connection refused, DNS, timeout) always use the
//! fallback.

use accesswash_shared::models::response::{first_field_error, FieldErrors};
use accesswash_shared::storage::StorageError;
use accesswash_shared::validation::into_field_errors;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use thiserror::Error;
use validator::ValidationErrors;

/// Client result type alias
pub type ClientResult<T> = Result<T, ClientError>;

/// Unified client error type
#[derive(Error, Debug)]
pub enum ClientError {
    /// Backend unreachable
    #[error("{message}")]
    Network { message: String },

    /// Request exceeded the configured timeout
    #[error("{message}")]
    Timeout { message: String },

    /// Backend rejected the input (400/422)
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    /// Session missing or expired (401); the session has already been torn down
    #[error("{message}")]
    Unauthorized { message: String },

    /// Any other non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Backend answered 2xx but reported `success: false`
    #[error("{0}")]
    Rejected(String),

    /// Response body did not have the expected shape
    #[error("{message}")]
    Decode { message: String },

    /// Input failed client-side validation; nothing was sent
    #[error("{message}")]
    InvalidInput { message: String, fields: FieldErrors },

    /// Session storage failure
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Client could not be constructed
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Builds an error from a non-success HTTP response
    pub fn from_response(status: StatusCode, body: &[u8], fallback: &str) -> Self {
        let json: Option<JsonValue> = serde_json::from_slice(body).ok();
        let fields = json
            .as_ref()
            .map(|body| extract_field_errors(status, body))
            .unwrap_or_default();

        let message = json
            .as_ref()
            .and_then(server_message)
            .or_else(|| first_field_error(&fields))
            .unwrap_or_else(|| fallback.to_string());

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized { message },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClientError::Validation { message, fields }
            }
            _ => ClientError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Builds an error from a transport-level failure
    pub fn from_transport(err: &reqwest::Error, fallback: &str) -> Self {
        tracing::debug!(error = %err, "HTTP transport error");

        if err.is_timeout() {
            ClientError::Timeout {
                message: fallback.to_string(),
            }
        } else if err.is_decode() {
            ClientError::Decode {
                message: fallback.to_string(),
            }
        } else {
            ClientError::Network {
                message: fallback.to_string(),
            }
        }
    }

    /// HTTP status, when the error came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { .. } => Some(401),
            ClientError::Validation { .. } => Some(400),
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Field-level messages, if any
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClientError::Validation { fields, .. } | ClientError::InvalidInput { fields, .. }
                if !fields.is_empty() =>
            {
                Some(fields)
            }
            _ => None,
        }
    }

    /// The message shown to the customer
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<ValidationErrors> for ClientError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = into_field_errors(&errors);
        let message = first_field_error(&fields)
            .unwrap_or_else(|| "Please check the form and try again".to_string());

        ClientError::InvalidInput { message, fields }
    }
}

fn server_message(body: &JsonValue) -> Option<String> {
    ["detail", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(JsonValue::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

fn extract_field_errors(status: StatusCode, body: &JsonValue) -> FieldErrors {
    if let Some(errors) = body.get("errors").and_then(JsonValue::as_object) {
        return collect_messages(errors);
    }

    // DRF serializers answer 400 with the field map as the whole body
    if status == StatusCode::BAD_REQUEST {
        if let Some(map) = body.as_object() {
            let reserved = ["detail", "message", "success", "data"];
            if !map.keys().any(|k| reserved.contains(&k.as_str())) {
                return collect_messages(map);
            }
        }
    }

    FieldErrors::new()
}

fn collect_messages(map: &serde_json::Map<String, JsonValue>) -> FieldErrors {
    map.iter()
        .filter_map(|(field, value)| {
            let messages: Vec<String> = match value {
                JsonValue::String(s) => vec![s.clone()],
                JsonValue::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
                _ => Vec::new(),
            };
            (!messages.is_empty()).then(|| (field.clone(), messages))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: JsonValue) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_prefers_detail_then_message() {
        let err = ClientError::from_response(
            StatusCode::FORBIDDEN,
            &body(json!({"detail": "Not allowed", "message": "ignored"})),
            "fallback",
        );
        assert_eq!(err.to_string(), "Not allowed");
        assert_eq!(err.status(), Some(403));

        let err = ClientError::from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &body(json!({"message": "Database down"})),
            "fallback",
        );
        assert_eq!(err.to_string(), "Database down");
    }

    #[test]
    fn test_falls_back_when_body_is_not_json() {
        let err = ClientError::from_response(StatusCode::BAD_GATEWAY, b"<html>", "Login failed");
        assert_eq!(err.to_string(), "Login failed");
        assert!(matches!(err, ClientError::Server { status: 502, .. }));
    }

    #[test]
    fn test_unauthorized() {
        let err = ClientError::from_response(
            StatusCode::UNAUTHORIZED,
            &body(json!({"detail": "Token expired"})),
            "fallback",
        );
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Token expired");
    }

    #[test]
    fn test_validation_errors_map() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            &body(json!({"success": false, "errors": {"email": ["Already registered"]}})),
            "Registration failed",
        );
        assert_eq!(err.to_string(), "email: Already registered");
        assert_eq!(err.field_errors().unwrap()["email"], vec!["Already registered"]);
    }

    #[test]
    fn test_bare_drf_field_map() {
        let err = ClientError::from_response(
            StatusCode::BAD_REQUEST,
            &body(json!({"phone_number": "Invalid", "title": ["Too long"]})),
            "fallback",
        );
        let fields = err.field_errors().unwrap();
        assert_eq!(fields.len(), 2);
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn test_local_validation_conversion() {
        let mut errors = ValidationErrors::new();
        errors.add(
            "email",
            accesswash_shared::validation::error("email", "Enter a valid email address"),
        );

        let err = ClientError::from(errors);
        assert_eq!(err.to_string(), "email: Enter a valid email address");
        assert!(matches!(err, ClientError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejected_message() {
        let err = ClientError::Rejected("Account locked".to_string());
        assert_eq!(err.user_message(), "Account locked");
        assert_eq!(err.status(), None);
    }
}
