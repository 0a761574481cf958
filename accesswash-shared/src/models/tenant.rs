//! Tenant branding and contact details
//!
//! Served by `GET /core/tenant-info/`. Older deployments do not expose that
//! endpoint, so [`TenantInfo::fallback`] synthesizes a usable default from the
//! slug alone.

use crate::tenant::TenantSlug;
use serde::{Deserialize, Serialize};

/// Branding color used when a tenant has not configured one
pub const DEFAULT_PRIMARY_COLOR: &str = "#4285F4";

/// Support line used when a tenant has not configured one
pub const DEFAULT_CONTACT_PHONE: &str = "+254 20 445 2000";

/// Tenant metadata shown on every page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantInfo {
    /// Utility display name
    pub name: String,

    /// Logo URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Branding color (CSS hex)
    #[serde(default = "default_primary_color")]
    pub primary_color: String,

    /// Customer care phone
    #[serde(default)]
    pub contact_phone: String,

    /// Customer care email
    #[serde(default)]
    pub contact_email: String,

    /// Emergency line (bursts, contamination)
    #[serde(default)]
    pub emergency_phone: String,
}

fn default_primary_color() -> String {
    DEFAULT_PRIMARY_COLOR.to_string()
}

impl TenantInfo {
    /// Default metadata for a tenant whose backend did not answer
    pub fn fallback(slug: &TenantSlug) -> Self {
        Self {
            name: slug.default_display_name(),
            logo_url: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
            contact_phone: DEFAULT_CONTACT_PHONE.to_string(),
            contact_email: format!("info@{}water.org", slug),
            emergency_phone: DEFAULT_CONTACT_PHONE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback() {
        let info = TenantInfo::fallback(&TenantSlug::from("nakuru"));

        assert_eq!(info.name, "Nakuru Water");
        assert_eq!(info.primary_color, "#4285F4");
        assert_eq!(info.contact_email, "info@nakuruwater.org");
        assert_eq!(info.contact_phone, info.emergency_phone);
        assert!(info.logo_url.is_none());
    }

    #[test]
    fn test_deserialize_defaults_color() {
        let info: TenantInfo = serde_json::from_str(r#"{"name": "Demo Water"}"#).unwrap();
        assert_eq!(info.primary_color, DEFAULT_PRIMARY_COLOR);
        assert!(info.contact_phone.is_empty());
    }
}
