//! Tenant resolution
//!
//! Every utility served by the portal is a tenant. The tenant slug is taken
//! from the request host when it sits under the platform root domain
//! (`demo.accesswash.org`), otherwise from the first path segment
//! (`/acme/dashboard`), otherwise a fixed default is used.
//!
//! Resolution never fails.
//!
//! # Example
//!
//! ```
//! use accesswash_shared::tenant::TenantResolver;
//!
//! let resolver = TenantResolver::default();
//!
//! assert_eq!(resolver.resolve(Some("demo.accesswash.org"), None).as_str(), "demo");
//! assert_eq!(resolver.resolve(None, Some("/acme/dashboard")).as_str(), "acme");
//! assert_eq!(resolver.resolve(None, None).as_str(), "demo");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Platform root domain
pub const DEFAULT_ROOT_DOMAIN: &str = "accesswash.org";

/// Tenant used when neither host nor path identify one
pub const DEFAULT_TENANT: &str = "demo";

/// Resolved tenant identifier
///
/// Immutable for the lifetime of a session. Used to build the tenant's API
/// base URL and to namespace stored session data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantSlug(String);

impl TenantSlug {
    /// Wraps a slug as-is
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the tenant's landing page
    pub fn home_path(&self) -> String {
        format!("/{}", self.0)
    }

    /// Path of the tenant's login page
    pub fn login_path(&self) -> String {
        format!("/{}/auth/login", self.0)
    }

    /// Display name derived from the slug ("acme" -> "Acme Water")
    pub fn default_display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => format!("{}{} Water", first.to_uppercase(), chars.as_str()),
            None => "Water".to_string(),
        }
    }
}

impl fmt::Display for TenantSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantSlug {
    fn from(slug: &str) -> Self {
        Self::new(slug)
    }
}

impl AsRef<str> for TenantSlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves tenant slugs from hosts and paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantResolver {
    root_domain: String,
    default_tenant: String,
}

impl Default for TenantResolver {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_DOMAIN, DEFAULT_TENANT)
    }
}

impl TenantResolver {
    /// Creates a resolver for the given root domain and fallback tenant
    pub fn new(root_domain: impl Into<String>, default_tenant: impl Into<String>) -> Self {
        Self {
            root_domain: root_domain.into(),
            default_tenant: default_tenant.into(),
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    pub fn default_tenant(&self) -> TenantSlug {
        TenantSlug::new(self.default_tenant.clone())
    }

    /// Resolves a tenant from an optional hostname and an optional path
    ///
    /// The host wins when it contains the root domain. A path only counts
    /// when it starts with `/` and its first segment is non-empty.
    pub fn resolve(&self, hostname: Option<&str>, pathname: Option<&str>) -> TenantSlug {
        if let Some(slug) = hostname.and_then(|host| self.from_host(host)) {
            return slug;
        }

        if let Some(slug) = pathname.and_then(from_path) {
            return slug;
        }

        self.default_tenant()
    }

    /// Resolves a tenant from a full URL, falling back to the default when
    /// the URL does not parse
    pub fn resolve_url(&self, raw: &str) -> TenantSlug {
        match Url::parse(raw) {
            Ok(url) => self.resolve(url.host_str(), Some(url.path())),
            Err(err) => {
                tracing::debug!(url = raw, error = %err, "Unparseable URL, using default tenant");
                self.default_tenant()
            }
        }
    }

    fn from_host(&self, hostname: &str) -> Option<TenantSlug> {
        if self.root_domain.is_empty() || !hostname.contains(&self.root_domain) {
            return None;
        }

        hostname
            .split('.')
            .next()
            .filter(|label| !label.is_empty())
            .map(TenantSlug::from)
    }
}

fn from_path(pathname: &str) -> Option<TenantSlug> {
    pathname
        .strip_prefix('/')?
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(TenantSlug::from)
}

/// Resolves a tenant with the platform defaults
pub fn extract_tenant(hostname: Option<&str>, pathname: Option<&str>) -> TenantSlug {
    TenantResolver::default().resolve(hostname, pathname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_subdomain() {
        assert_eq!(extract_tenant(Some("demo.accesswash.org"), None).as_str(), "demo");
        assert_eq!(extract_tenant(Some("nairobi.accesswash.org"), None).as_str(), "nairobi");
    }

    #[test]
    fn test_host_takes_precedence_over_path() {
        let slug = extract_tenant(Some("kisumu.accesswash.org"), Some("/acme/dashboard"));
        assert_eq!(slug.as_str(), "kisumu");
    }

    #[test]
    fn test_resolve_from_path_when_host_does_not_match() {
        let slug = extract_tenant(Some("localhost"), Some("/acme/dashboard"));
        assert_eq!(slug.as_str(), "acme");

        let slug = extract_tenant(None, Some("/acme"));
        assert_eq!(slug.as_str(), "acme");
    }

    #[test]
    fn test_falls_back_to_default() {
        assert_eq!(extract_tenant(None, None).as_str(), "demo");
        assert_eq!(extract_tenant(Some("localhost"), Some("/")).as_str(), "demo");
        assert_eq!(extract_tenant(None, Some("")).as_str(), "demo");
        assert_eq!(extract_tenant(None, Some("//dashboard")).as_str(), "demo");
    }

    #[test]
    fn test_path_without_leading_slash_is_ignored() {
        assert_eq!(extract_tenant(None, Some("acme/dashboard")).as_str(), "demo");
    }

    #[test]
    fn test_custom_root_domain_and_default() {
        let resolver = TenantResolver::new("water.test", "central");

        assert_eq!(resolver.resolve(Some("east.water.test"), None).as_str(), "east");
        assert_eq!(resolver.resolve(Some("demo.accesswash.org"), None).as_str(), "central");
        assert_eq!(resolver.default_tenant().as_str(), "central");
    }

    #[test]
    fn test_resolve_url() {
        let resolver = TenantResolver::default();

        assert_eq!(resolver.resolve_url("https://demo.accesswash.org/auth/login").as_str(), "demo");
        assert_eq!(resolver.resolve_url("http://localhost:3000/acme/requests").as_str(), "acme");
        assert_eq!(resolver.resolve_url("not a url").as_str(), "demo");
    }

    #[test]
    fn test_slug_paths_and_display_name() {
        let slug = TenantSlug::from("acme");

        assert_eq!(slug.home_path(), "/acme");
        assert_eq!(slug.login_path(), "/acme/auth/login");
        assert_eq!(slug.default_display_name(), "Acme Water");
        assert_eq!(slug.to_string(), "acme");
    }
}
