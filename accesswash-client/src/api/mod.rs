//! Per-tenant API client
//!
//! [`ApiClient`] talks to one tenant's backend. Every request goes through a
//! single path that:
//!
//! - attaches `Authorization: Bearer <token>` when the tenant has a stored token
//! - tears the session down and redirects to `/{tenant}/auth/login` on 401,
//!   before the caller sees the error
//! - turns every other failure into a [`ClientError`] with one display message
//!
//! There is no retry, queuing, or de-duplication. The only deadline is the
//! configured per-request timeout.
//!
//! # Endpoint groups
//!
//! - `auth`: login, registration, logout, password flows, connection lookup
//! - `portal`: dashboard, profile, sessions, tenant info
//! - `support`: service requests, comments, ratings, photos
//!
//! # Example
//!
//! ```no_run
//! use accesswash_client::api::ApiClients;
//! use accesswash_client::config::ClientConfig;
//! use accesswash_client::navigation::LogNavigator;
//! use accesswash_shared::models::customer::LoginCredentials;
//! use accesswash_shared::storage::MemoryStore;
//! use accesswash_shared::tenant::TenantSlug;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let clients = ApiClients::new(
//!     ClientConfig::from_env()?,
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(LogNavigator),
//! )?;
//!
//! let api = clients.for_tenant(&TenantSlug::from("demo"));
//! let payload = api.login(&LoginCredentials::new("jane@example.com", "waterworks1")).await?;
//! println!("Signed in as {}", payload.customer.display_name());
//! # Ok(())
//! # }
//! ```

mod auth;
mod portal;
mod support;

pub use support::PhotoUpload;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::navigation::Navigator;
use accesswash_shared::models::customer::Customer;
use accesswash_shared::models::response::ApiResponse;
use accesswash_shared::storage::{SessionStore, TenantSession};
use accesswash_shared::tenant::TenantSlug;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Client bound to one tenant's backend and session namespace
///
/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: TenantSession,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("tenant", self.session.slug())
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a standalone client for one tenant
    ///
    /// Prefer [`ApiClients::for_tenant`] when several tenants are in play so
    /// the connection pool is shared.
    pub fn new(
        tenant: TenantSlug,
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let http = build_http_client(config)?;
        Ok(Self::with_http(http, tenant, config, store, navigator))
    }

    fn with_http(
        http: reqwest::Client,
        tenant: TenantSlug,
        config: &ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let base_url = config.base_url_for(&tenant);
        let session = TenantSession::with_ttl(store, tenant, config.session_ttl());

        Self {
            http,
            base_url,
            session,
            navigator,
        }
    }

    pub fn tenant(&self) -> &TenantSlug {
        self.session.slug()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stored bearer token for this tenant
    pub fn auth_token(&self) -> Option<String> {
        self.session.token().unwrap_or_else(|err| {
            tracing::warn!(tenant = %self.tenant(), error = %err, "Failed to read stored token");
            None
        })
    }

    /// Stored customer snapshot for this tenant
    pub fn current_customer(&self) -> Option<Customer> {
        self.session.customer().unwrap_or_else(|err| {
            tracing::warn!(tenant = %self.tenant(), error = %err, "Failed to read stored customer");
            None
        })
    }

    /// Token and customer snapshot are both stored
    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some() && self.current_customer().is_some()
    }

    /// Removes this tenant's stored session
    pub fn clear_session(&self) {
        if let Err(err) = self.session.clear() {
            tracing::warn!(tenant = %self.tenant(), error = %err, "Failed to clear stored session");
        }
    }

    pub(crate) fn session(&self) -> &TenantSession {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!(tenant = %self.tenant(), %method, path, "API request");
        self.http.request(method, self.url(path))
    }

    /// Sends a request through the shared token and error handling path
    async fn execute(&self, builder: RequestBuilder, fallback: &str) -> ClientResult<Response> {
        let builder = match self.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|err| ClientError::from_transport(&err, fallback))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
        }

        Err(ClientError::from_response(status, &body, fallback))
    }

    /// Session teardown for a 401, run once per offending response
    fn handle_unauthorized(&self) {
        let tenant = self.tenant();
        tracing::warn!(%tenant, "Session rejected by backend, signing out");

        self.clear_session();
        self.navigator.navigate(&tenant.login_path());
    }

    async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> ClientResult<T> {
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::from_transport(&err, fallback))?;

        serde_json::from_slice(&body).map_err(|err| {
            tracing::warn!(error = %err, "Unexpected response body");
            ClientError::Decode {
                message: fallback.to_string(),
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> ClientResult<T> {
        let response = self.execute(self.request(Method::GET, path), fallback).await?;
        Self::decode(response, fallback).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B, fallback: &str) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .execute(self.request(method, path).json(body), fallback)
            .await?;
        Self::decode(response, fallback).await
    }

    /// POST without a body; the response body is ignored
    async fn post_empty(&self, path: &str, fallback: &str) -> ClientResult<()> {
        self.execute(self.request(Method::POST, path), fallback).await?;
        Ok(())
    }
}

/// Unwraps an enveloped payload, turning `success: false` into an error
fn expect_data<T>(response: ApiResponse<T>, fallback: &str) -> ClientResult<T> {
    let message = response.message.clone();
    response
        .into_data()
        .ok_or_else(|| ClientError::Rejected(message.unwrap_or_else(|| fallback.to_string())))
}

/// Body that is either the bare resource or an envelope around it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MaybeEnveloped<T> {
    Bare(T),
    Envelope(ApiResponse<T>),
}

impl<T> MaybeEnveloped<T> {
    fn into_result(self, fallback: &str) -> ClientResult<T> {
        match self {
            MaybeEnveloped::Bare(value) => Ok(value),
            MaybeEnveloped::Envelope(envelope) => expect_data(envelope, fallback),
        }
    }
}

fn build_http_client(config: &ClientConfig) -> ClientResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("accesswash-client/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|err| ClientError::Config(err.to_string()))
}

/// Factory that hands out one [`ApiClient`] per tenant
///
/// All clients share one connection pool, one session store, and one
/// navigator.
pub struct ApiClients {
    config: ClientConfig,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    clients: Mutex<HashMap<TenantSlug, ApiClient>>,
}

impl std::fmt::Debug for ApiClients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClients")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ApiClients {
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let http = build_http_client(&config)?;

        Ok(Self {
            config,
            http,
            store,
            navigator,
            clients: Mutex::new(HashMap::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Client for `tenant`, created on first use
    pub fn for_tenant(&self, tenant: &TenantSlug) -> ApiClient {
        let build = || {
            ApiClient::with_http(
                self.http.clone(),
                tenant.clone(),
                &self.config,
                self.store.clone(),
                self.navigator.clone(),
            )
        };

        match self.clients.lock() {
            Ok(mut clients) => clients.entry(tenant.clone()).or_insert_with(build).clone(),
            // A poisoned cache only costs us the reuse
            Err(_) => build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::RecordingNavigator;
    use accesswash_shared::storage::MemoryStore;

    fn clients(config: ClientConfig) -> ApiClients {
        ApiClients::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNavigator::new()),
        )
        .unwrap()
    }

    #[test]
    fn test_factory_uses_tenant_base_url() {
        let clients = clients(ClientConfig::default());

        let acme = clients.for_tenant(&TenantSlug::from("acme"));
        assert_eq!(acme.base_url(), "https://acme.accesswash.org/api");
        assert_eq!(acme.url("/portal/dashboard/"), "https://acme.accesswash.org/api/portal/dashboard/");
        assert_eq!(acme.tenant().as_str(), "acme");
    }

    #[test]
    fn test_factory_reuses_clients() {
        let clients = clients(ClientConfig::default());
        let slug = TenantSlug::from("acme");

        clients.for_tenant(&slug);
        clients.for_tenant(&slug);
        clients.for_tenant(&TenantSlug::from("demo"));

        assert_eq!(clients.clients.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_expect_data() {
        let ok: ApiResponse<u32> = ApiResponse::ok(3);
        assert_eq!(expect_data(ok, "fallback").unwrap(), 3);

        let rejected: ApiResponse<u32> = ApiResponse {
            success: false,
            data: None,
            message: Some("Account suspended".to_string()),
            errors: None,
        };
        assert_eq!(expect_data(rejected, "fallback").unwrap_err().to_string(), "Account suspended");

        let empty: ApiResponse<u32> = ApiResponse {
            success: false,
            data: None,
            message: None,
            errors: None,
        };
        assert_eq!(expect_data(empty, "fallback").unwrap_err().to_string(), "fallback");
    }
}
