//! Client-side input checks
//!
//! The backend remains the authority on every rule; these checks only catch
//! obvious mistakes before a round trip. Request types in [`crate::models`]
//! derive [`validator::Validate`] and call into the helpers below.
//!
//! # Example
//!
//! ```
//! use accesswash_shared::validation::{is_valid_phone_number, normalize_phone_number};
//!
//! assert!(is_valid_phone_number("0712 345 678"));
//! assert_eq!(normalize_phone_number("0712345678"), "+254712345678");
//! ```

use crate::models::response::FieldErrors;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// Minimum password length accepted by the portal backend
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Checks a Kenyan mobile number (`+2547XXXXXXXX`, `07XXXXXXXX`, `01XXXXXXXX`)
///
/// Whitespace is ignored.
pub fn is_valid_phone_number(phone: &str) -> bool {
    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();

    let national = if let Some(rest) = compact.strip_prefix("+254") {
        rest
    } else if let Some(rest) = compact.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    let mut chars = national.chars();
    matches!(chars.next(), Some('7') | Some('1'))
        && national.len() == 9
        && chars.all(|c| c.is_ascii_digit())
}

/// Rewrites a local number into international form
///
/// `0712345678` and `254712345678` both become `+254712345678`. Anything
/// else is returned unchanged.
pub fn normalize_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with("254") {
        format!("+{}", digits)
    } else if let Some(rest) = digits.strip_prefix('0') {
        format!("+254{}", rest)
    } else {
        phone.to_string()
    }
}

/// Checks the password rules the backend enforces on registration and resets
pub fn check_password(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("Password cannot be entirely numeric".to_string());
    }

    Ok(())
}

/// `validator` hook for phone number fields
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if is_valid_phone_number(phone) {
        Ok(())
    } else {
        Err(error("phone", "Enter a valid phone number (e.g. 0712 345 678)"))
    }
}

/// `validator` hook for new password fields
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    check_password(password).map_err(|message| error("password", message))
}

/// Builds a `ValidationError` with a message
pub fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Flattens `validator` errors into the backend's field error shape
pub fn into_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();

    for (field, errs) in errors.field_errors() {
        let messages = errs
            .iter()
            .map(|err| {
                err.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string())
            })
            .collect();
        fields.insert(field.to_string(), messages);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_phone_numbers() {
        for phone in ["0712345678", "+254712345678", "0112 345 678", "+254 110 345 678"] {
            assert!(is_valid_phone_number(phone), "{} should be valid", phone);
        }
    }

    #[test]
    fn test_invalid_phone_numbers() {
        for phone in ["", "0812345678", "071234567", "07123456789", "254712345678", "07123x5678"] {
            assert!(!is_valid_phone_number(phone), "{} should be invalid", phone);
        }
    }

    #[test]
    fn test_normalize_phone_number() {
        assert_eq!(normalize_phone_number("0712 345 678"), "+254712345678");
        assert_eq!(normalize_phone_number("254712345678"), "+254712345678");
        assert_eq!(normalize_phone_number("+254712345678"), "+254712345678");
        assert_eq!(normalize_phone_number("5551234"), "5551234");
    }

    #[test]
    fn test_check_password() {
        assert!(check_password("waterworks1").is_ok());
        assert!(check_password("short").is_err());
        assert_eq!(
            check_password("1234567890").unwrap_err(),
            "Password cannot be entirely numeric"
        );
    }
}
