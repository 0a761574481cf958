//! Configuration management for the portal client
//!
//! Configuration is read from `ACCESSWASH_*` environment variables (a `.env`
//! file is honored in development) and layered over built-in defaults.
//!
//! # Environment Variables
//!
//! - `ACCESSWASH_ROOT_DOMAIN`: Platform root domain (default: accesswash.org)
//! - `ACCESSWASH_DEFAULT_TENANT`: Tenant used when none can be resolved (default: demo)
//! - `ACCESSWASH_ENVIRONMENT`: `development` or `production` (default: production)
//! - `ACCESSWASH_API_BASE_URL`: Fixed API base URL for every tenant (optional)
//! - `ACCESSWASH_REQUEST_TIMEOUT_SECS`: Per-request timeout (default: 10)
//! - `ACCESSWASH_SESSION_TTL_DAYS`: Lifetime of stored sessions (default: 7)
//! - `ACCESSWASH_SESSION_DIR`: Where the CLI keeps sessions (default: .accesswash)
//!
//! # Example
//!
//! ```no_run
//! use accesswash_client::config::ClientConfig;
//! use accesswash_shared::tenant::TenantSlug;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! println!("API for demo: {}", config.base_url_for(&TenantSlug::from("demo")));
//! # Ok(())
//! # }
//! ```

use accesswash_shared::storage::DEFAULT_SESSION_TTL_DAYS;
use accesswash_shared::tenant::{TenantResolver, TenantSlug, DEFAULT_ROOT_DOMAIN, DEFAULT_TENANT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Accepted range for `session_ttl_days`
pub const SESSION_TTL_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// Port the tenant backends listen on in development
pub const DEVELOPMENT_API_PORT: u16 = 8000;

/// Deployment environment, selects the API scheme and port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// `http://{tenant}.{root}:8000/api`
    Development,

    /// `https://{tenant}.{root}/api`
    #[default]
    Production,
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Platform root domain; tenant backends live on its subdomains
    pub root_domain: String,

    /// Tenant used when neither host nor path name one
    pub default_tenant: String,

    /// Deployment environment
    pub environment: Environment,

    /// Overrides the per-tenant base URL (self-hosting, tests)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Lifetime of stored session values in days
    pub session_ttl_days: i64,

    /// Directory for on-disk sessions
    pub session_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            root_domain: DEFAULT_ROOT_DOMAIN.to_string(),
            default_tenant: DEFAULT_TENANT.to_string(),
            environment: Environment::default(),
            api_base_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            session_dir: PathBuf::from(".accesswash"),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value of the wrong type
    /// (for example a non-numeric timeout), or if [`ClientConfig::validate`]
    /// rejects the result.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config: Self = ::config::Config::builder()
            .set_default("root_domain", defaults.root_domain)?
            .set_default("default_tenant", defaults.default_tenant)?
            .set_default("environment", "production")?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("session_ttl_days", defaults.session_ttl_days)?
            .set_default("session_dir", defaults.session_dir.to_string_lossy().into_owned())?
            .add_source(::config::Environment::with_prefix("ACCESSWASH").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks the numeric settings
    ///
    /// The timeout must be positive and the session lifetime must lie in
    /// [`SESSION_TTL_DAYS_RANGE`].
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("ACCESSWASH_REQUEST_TIMEOUT_SECS must be greater than zero");
        }

        if !SESSION_TTL_DAYS_RANGE.contains(&self.session_ttl_days) {
            anyhow::bail!(
                "ACCESSWASH_SESSION_TTL_DAYS must be between {} and {}, got {}",
                SESSION_TTL_DAYS_RANGE.start(),
                SESSION_TTL_DAYS_RANGE.end(),
                self.session_ttl_days
            );
        }

        Ok(())
    }

    /// Points every tenant at a fixed base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = Some(base_url.into());
        self
    }

    /// API base URL for a tenant, without a trailing slash
    pub fn base_url_for(&self, tenant: &TenantSlug) -> String {
        if let Some(base) = &self.api_base_url {
            return base.trim_end_matches('/').to_string();
        }

        match self.environment {
            Environment::Development => format!(
                "http://{}.{}:{}/api",
                tenant, self.root_domain, DEVELOPMENT_API_PORT
            ),
            Environment::Production => format!("https://{}.{}/api", tenant, self.root_domain),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session lifetime, clamped to [`SESSION_TTL_DAYS_RANGE`]
    pub fn session_ttl(&self) -> chrono::Duration {
        let days = self
            .session_ttl_days
            .clamp(*SESSION_TTL_DAYS_RANGE.start(), *SESSION_TTL_DAYS_RANGE.end());
        chrono::Duration::days(days)
    }

    /// Tenant resolver using this configuration's domain and default
    pub fn resolver(&self) -> TenantResolver {
        TenantResolver::new(self.root_domain.clone(), self.default_tenant.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_base_url() {
        let config = ClientConfig::default();
        assert_eq!(
            config.base_url_for(&TenantSlug::from("demo")),
            "https://demo.accesswash.org/api"
        );
    }

    #[test]
    fn test_development_base_url() {
        let config = ClientConfig {
            environment: Environment::Development,
            ..Default::default()
        };
        assert_eq!(
            config.base_url_for(&TenantSlug::from("acme")),
            "http://acme.accesswash.org:8000/api"
        );
    }

    #[test]
    fn test_override_base_url() {
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9000/api/");
        assert_eq!(
            config.base_url_for(&TenantSlug::from("acme")),
            "http://127.0.0.1:9000/api"
        );
    }

    #[test]
    fn test_resolver_uses_configured_domain() {
        let config = ClientConfig {
            root_domain: "water.test".to_string(),
            default_tenant: "central".to_string(),
            ..Default::default()
        };
        let resolver = config.resolver();
        assert_eq!(resolver.resolve(Some("east.water.test"), None).as_str(), "east");
        assert_eq!(resolver.resolve(None, None).as_str(), "central");
    }

    #[test]
    fn test_durations() {
        let config = ClientConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.session_ttl(), chrono::Duration::days(7));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = ClientConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_session_ttl() {
        for days in [0, -1, 3651, 100_000_000, i64::MAX, i64::MIN] {
            let config = ClientConfig {
                session_ttl_days: days,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("ACCESSWASH_SESSION_TTL_DAYS"), "{}", err);
        }

        for days in [1, 3650] {
            let config = ClientConfig {
                session_ttl_days: days,
                ..Default::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_session_ttl_never_panics() {
        let huge = ClientConfig {
            session_ttl_days: i64::MAX,
            ..Default::default()
        };
        assert_eq!(huge.session_ttl(), chrono::Duration::days(3650));

        let negative = ClientConfig {
            session_ttl_days: -5,
            ..Default::default()
        };
        assert_eq!(negative.session_ttl(), chrono::Duration::days(1));
    }
}
