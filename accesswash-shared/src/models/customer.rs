//! Customer identity and authentication payloads
//!
//! A customer is the account holder of a water connection. They sign in with
//! an email address or phone number and receive a bearer token scoped to one
//! tenant.
//!
//! # Example
//!
//! ```
//! use accesswash_shared::models::customer::LoginCredentials;
//!
//! let credentials = LoginCredentials::new("jane@example.com", "waterworks1");
//! let body = serde_json::to_value(&credentials).unwrap();
//! assert_eq!(body["username"], "jane@example.com");
//! ```

use crate::validation::{error, validate_password, validate_phone};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

/// Kind of service a connection is billed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Residential,
    Commercial,
    Industrial,
    Institutional,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Residential => "residential",
            ServiceType::Commercial => "commercial",
            ServiceType::Industrial => "industrial",
            ServiceType::Institutional => "institutional",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authenticated customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Backend identifier
    pub id: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default)]
    pub full_name: String,

    /// Utility billing account number
    #[serde(default)]
    pub account_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,

    #[serde(default)]
    pub property_address: String,

    #[serde(default)]
    pub service_type: ServiceType,

    /// Preferred language code ("en", "sw")
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub email_verified: bool,

    #[serde(default)]
    pub phone_verified: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_language() -> String {
    "en".to_string()
}

impl Customer {
    /// Name to greet the customer with
    pub fn display_name(&self) -> String {
        if !self.full_name.is_empty() {
            return self.full_name.clone();
        }

        let joined = format!("{} {}", self.first_name, self.last_name);
        let joined = joined.trim();
        if joined.is_empty() {
            self.email.clone()
        } else {
            joined.to_string()
        }
    }

    /// Up to two uppercase initials ("Jane Wanjiru" -> "JW")
    pub fn initials(&self) -> String {
        self.display_name()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(|c| c.to_uppercase())
            .take(2)
            .collect()
    }
}

/// Tokens issued on login and registration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Bearer token sent on every authenticated request
    pub access_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"[redacted]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[redacted]"))
            .field("expires_in", &self.expires_in)
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Customer plus tokens, returned by login and registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub customer: Customer,
    pub tokens: AuthTokens,
}

/// Login and registration response
///
/// Deployments disagree on where the payload sits: some nest it under
/// `data`, others put `customer` and `tokens` at the top level. Both are
/// accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthEnvelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub data: Option<AuthPayload>,

    #[serde(default)]
    pub customer: Option<Customer>,

    #[serde(default)]
    pub tokens: Option<AuthTokens>,

    #[serde(default)]
    pub message: Option<String>,
}

impl AuthEnvelope {
    /// Extracts the payload when the backend reports success
    pub fn into_payload(self) -> Option<AuthPayload> {
        if !self.success {
            return None;
        }

        match (self.data, self.customer, self.tokens) {
            (Some(payload), _, _) => Some(payload),
            (None, Some(customer), Some(tokens)) => Some(AuthPayload { customer, tokens }),
            _ => None,
        }
    }
}

/// Login form
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginCredentials {
    /// Email address or phone number
    #[validate(length(min = 1, message = "Email or phone number is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Self-service registration form
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterData {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,

    #[validate(custom(function = "validate_password"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,

    #[validate(length(min = 1, max = 150, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 150, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(min = 1, message = "Property address is required"))]
    pub property_address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Partial profile update (`PUT /portal/profile/`)
///
/// Only fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_phone"))]
    pub phone_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Pre-registration lookup of a physical water connection
///
/// Either the account number or the meter number identifies the connection;
/// last name and phone number confirm ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_connection_lookup"))]
pub struct ConnectionLookup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(custom(function = "validate_phone"))]
    pub phone_number: String,
}

fn validate_connection_lookup(lookup: &ConnectionLookup) -> Result<(), ValidationError> {
    let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());

    if present(&lookup.account_number) || present(&lookup.meter_number) {
        Ok(())
    } else {
        Err(error(
            "identifier",
            "Provide an account number or a meter number",
        ))
    }
}

/// Connection details used to pre-fill registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedConnection {
    #[serde(default)]
    pub account_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,

    #[serde(default)]
    pub property_address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<ServiceType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
}

/// `POST /portal/auth/forgot-password/`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordData {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
}

/// `POST /portal/auth/reset-password/`
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordData {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,

    #[validate(custom(function = "validate_password"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub new_password_confirm: String,
}

impl fmt::Debug for ResetPasswordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResetPasswordData").finish_non_exhaustive()
    }
}

/// `POST /portal/auth/change-password/`
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordData {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password"))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub new_password_confirm: String,
}

impl fmt::Debug for ChangePasswordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangePasswordData").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn customer_json() -> serde_json::Value {
        json!({
            "id": "c-1",
            "email": "jane@example.com",
            "first_name": "Jane",
            "last_name": "Wanjiru",
            "full_name": "Jane Wanjiru",
            "account_number": "ACC-001",
            "property_address": "12 Riverside Dr",
            "service_type": "residential",
            "language": "en",
            "email_verified": true,
            "phone_verified": false,
            "created_at": "2024-03-01T08:00:00Z"
        })
    }

    fn valid_registration() -> RegisterData {
        RegisterData {
            email: "jane@example.com".to_string(),
            phone_number: "0712345678".to_string(),
            password: "waterworks1".to_string(),
            password_confirm: "waterworks1".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Wanjiru".to_string(),
            property_address: "12 Riverside Dr".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_customer_deserialize() {
        let customer: Customer = serde_json::from_value(customer_json()).unwrap();

        assert_eq!(customer.id, "c-1");
        assert_eq!(customer.service_type, ServiceType::Residential);
        assert!(customer.phone_number.is_none());
        assert_eq!(customer.display_name(), "Jane Wanjiru");
        assert_eq!(customer.initials(), "JW");
    }

    #[test]
    fn test_display_name_falls_back() {
        let mut customer: Customer = serde_json::from_value(customer_json()).unwrap();
        customer.full_name.clear();
        assert_eq!(customer.display_name(), "Jane Wanjiru");

        customer.first_name.clear();
        customer.last_name.clear();
        assert_eq!(customer.display_name(), "jane@example.com");
    }

    #[test]
    fn test_auth_envelope_nested_and_flat() {
        let tokens = json!({"access_token": "abc", "refresh_token": "def", "expires_in": 3600});

        let nested: AuthEnvelope = serde_json::from_value(json!({
            "success": true,
            "data": {"customer": customer_json(), "tokens": tokens.clone()}
        }))
        .unwrap();
        assert_eq!(nested.into_payload().unwrap().tokens.access_token, "abc");

        let flat: AuthEnvelope = serde_json::from_value(json!({
            "success": true,
            "customer": customer_json(),
            "tokens": tokens
        }))
        .unwrap();
        assert_eq!(flat.into_payload().unwrap().customer.id, "c-1");
    }

    #[test]
    fn test_auth_envelope_unsuccessful() {
        let envelope: AuthEnvelope = serde_json::from_value(json!({
            "success": false,
            "message": "Invalid credentials"
        }))
        .unwrap();
        assert_eq!(envelope.message.as_deref(), Some("Invalid credentials"));
        assert!(envelope.into_payload().is_none());
    }

    #[test]
    fn test_tokens_debug_is_redacted() {
        let tokens = AuthTokens {
            access_token: "secret-access".to_string(),
            refresh_token: Some("secret-refresh".to_string()),
            expires_in: None,
            session_id: None,
        };
        let debug = format!("{:?}", tokens);
        assert!(!debug.contains("secret"));

        let creds = LoginCredentials::new("jane", "hunter22");
        assert!(!format!("{:?}", creds).contains("hunter22"));
    }

    #[test]
    fn test_register_validation() {
        assert!(valid_registration().validate().is_ok());

        let mut data = valid_registration();
        data.password_confirm = "different1".to_string();
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password_confirm"));

        let mut data = valid_registration();
        data.email = "not-an-email".to_string();
        data.phone_number = "12345".to_string();
        let errors = data.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn test_register_serializes_without_empty_optionals() {
        let body = serde_json::to_value(valid_registration()).unwrap();
        assert!(body.get("account_number").is_none());
        assert_eq!(body["password_confirm"], "waterworks1");
    }

    #[test]
    fn test_connection_lookup_requires_identifier() {
        let lookup = ConnectionLookup {
            last_name: "Wanjiru".to_string(),
            phone_number: "0712345678".to_string(),
            ..Default::default()
        };
        assert!(lookup.validate().is_err());

        let lookup = ConnectionLookup {
            meter_number: Some("MTR-9".to_string()),
            ..lookup
        };
        assert!(lookup.validate().is_ok());
    }

    #[test]
    fn test_profile_update_serializes_set_fields_only() {
        let update = ProfileUpdate {
            language: Some("sw".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"language": "sw"}));
        assert!(ProfileUpdate::default().is_empty());
    }
}
