//! Tenant-namespaced session persistence
//!
//! The portal keeps three values per tenant: the bearer token, the refresh
//! token, and a JSON snapshot of the signed-in customer. Keys embed the
//! tenant slug so several tenants can be signed in side by side:
//!
//! ```text
//! accesswash_token_{slug}
//! accesswash_refresh_{slug}
//! accesswash_customer_{slug}
//! ```
//!
//! Every value is written with the same fixed expiry (7 days by default).
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, used in tests and embedded callers
//! - [`FileStore`]: one JSON file per key, used by the command line client
//!
//! # Example
//!
//! ```
//! use accesswash_shared::storage::{MemoryStore, TenantSession};
//! use accesswash_shared::tenant::TenantSlug;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), accesswash_shared::storage::StorageError> {
//! let store = Arc::new(MemoryStore::new());
//! let acme = TenantSession::new(store.clone(), TenantSlug::from("acme"));
//! let demo = TenantSession::new(store, TenantSlug::from("demo"));
//!
//! acme.set_token("abc")?;
//! assert_eq!(acme.token()?.as_deref(), Some("abc"));
//! assert_eq!(demo.token()?, None);
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::models::customer::{AuthPayload, Customer};
use crate::tenant::TenantSlug;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Prefix shared by every key this crate writes
pub const KEY_PREFIX: &str = "accesswash";

/// Lifetime of stored session values, in days
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be encoded or decoded
    #[error("Session storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is in an unusable state
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage result type alias
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value backend with per-entry expiry
///
/// Expired entries must read as absent.
pub trait SessionStore: Send + Sync {
    /// Reads a value
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value that expires after `ttl`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> StorageResult<()>;

    /// Deletes a value; deleting a missing key is not an error
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// A stored value with its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl StoredEntry {
    /// Entry expiring `ttl` from now
    ///
    /// A `ttl` past the representable range saturates at the latest (or, for
    /// negative values, earliest) timestamp.
    pub fn new(value: impl Into<String>, ttl: Duration) -> Self {
        let expires_at = Utc::now().checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        });

        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Which session value a key holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKey {
    Token,
    RefreshToken,
    Customer,
}

impl SessionKey {
    pub const ALL: [SessionKey; 3] = [SessionKey::Token, SessionKey::RefreshToken, SessionKey::Customer];

    fn name(&self) -> &'static str {
        match self {
            SessionKey::Token => "token",
            SessionKey::RefreshToken => "refresh",
            SessionKey::Customer => "customer",
        }
    }

    /// Full storage key for a tenant
    pub fn for_tenant(&self, slug: &TenantSlug) -> String {
        format!("{}_{}_{}", KEY_PREFIX, self.name(), slug)
    }
}

/// A [`SessionStore`] viewed through one tenant's key namespace
#[derive(Clone)]
pub struct TenantSession {
    store: Arc<dyn SessionStore>,
    slug: TenantSlug,
    ttl: Duration,
}

impl std::fmt::Debug for TenantSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantSession")
            .field("slug", &self.slug)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TenantSession {
    /// Creates a view with the default 7-day expiry
    pub fn new(store: Arc<dyn SessionStore>, slug: TenantSlug) -> Self {
        Self::with_ttl(store, slug, Duration::days(DEFAULT_SESSION_TTL_DAYS))
    }

    pub fn with_ttl(store: Arc<dyn SessionStore>, slug: TenantSlug, ttl: Duration) -> Self {
        Self { store, slug, ttl }
    }

    pub fn slug(&self) -> &TenantSlug {
        &self.slug
    }

    /// Bearer token, if one is stored and unexpired
    pub fn token(&self) -> StorageResult<Option<String>> {
        self.store.get(&SessionKey::Token.for_tenant(&self.slug))
    }

    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        self.store.set(&SessionKey::Token.for_tenant(&self.slug), token, self.ttl)
    }

    pub fn refresh_token(&self) -> StorageResult<Option<String>> {
        self.store.get(&SessionKey::RefreshToken.for_tenant(&self.slug))
    }

    /// Customer snapshot
    ///
    /// A snapshot that no longer parses is treated as absent.
    pub fn customer(&self) -> StorageResult<Option<Customer>> {
        let Some(raw) = self.store.get(&SessionKey::Customer.for_tenant(&self.slug))? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(customer) => Ok(Some(customer)),
            Err(err) => {
                tracing::warn!(tenant = %self.slug, error = %err, "Discarding unreadable customer snapshot");
                Ok(None)
            }
        }
    }

    pub fn set_customer(&self, customer: &Customer) -> StorageResult<()> {
        let raw = serde_json::to_string(customer)?;
        self.store.set(&SessionKey::Customer.for_tenant(&self.slug), &raw, self.ttl)
    }

    /// Persists everything a successful login or registration returns
    pub fn save(&self, payload: &AuthPayload) -> StorageResult<()> {
        self.set_token(&payload.tokens.access_token)?;

        let refresh_key = SessionKey::RefreshToken.for_tenant(&self.slug);
        match &payload.tokens.refresh_token {
            Some(refresh) => self.store.set(&refresh_key, refresh, self.ttl)?,
            None => self.store.remove(&refresh_key)?,
        }

        self.set_customer(&payload.customer)
    }

    /// Removes every value of this tenant
    ///
    /// All keys are attempted even if one fails; the first error is returned.
    pub fn clear(&self) -> StorageResult<()> {
        let mut first_error = None;

        for key in SessionKey::ALL {
            if let Err(err) = self.store.remove(&key.for_tenant(&self.slug)) {
                tracing::warn!(tenant = %self.slug, key = ?key, error = %err, "Failed to clear session value");
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Token and customer snapshot are both present
    pub fn is_authenticated(&self) -> StorageResult<bool> {
        Ok(self.token()?.is_some() && self.customer()?.is_some())
    }
}
