//! Authentication and session controller
//!
//! [`AuthController`] owns the state every portal page reads:
//!
//! ```text
//! customer          signed-in customer, if any
//! tenant_info       branding for the current tenant
//! loading           an action is in flight
//! error             message of the last failed action
//! is_authenticated  a stored token and customer snapshot exist
//! ```
//!
//! Actions take the tenant slug, call that tenant's [`ApiClient`], and publish
//! the resulting state to every subscriber. Each action sets `loading` before
//! calling out and clears it on every exit path. Failures are stored as a
//! single human-readable message and also returned to the caller.
//!
//! A 401 from any action has already cleared the stored session and requested
//! navigation to the login page by the time the controller sees it; the
//! controller then drops the in-memory identity as well.
//!
//! # Example
//!
//! ```no_run
//! use accesswash_client::api::ApiClients;
//! use accesswash_client::config::ClientConfig;
//! use accesswash_client::controller::AuthController;
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
//! let controller = AuthController::new(Arc::new(clients));
//! let tenant = TenantSlug::from("demo");
//!
//! let mut updates = controller.subscribe();
//! tokio::spawn(async move {
//!     while updates.changed().await.is_ok() {
//!         let state = updates.borrow().clone();
//!         println!("loading={} error={:?}", state.loading, state.error);
//!     }
//! });
//!
//! controller
//!     .login(&tenant, &LoginCredentials::new("jane@example.com", "waterworks1"))
//!     .await?;
//! assert!(controller.state().is_authenticated);
//! # Ok(())
//! # }
//! ```

use crate::api::{ApiClient, ApiClients};
use crate::error::{ClientError, ClientResult};
use crate::navigation::{guard_route, RouteDecision};
use accesswash_shared::models::customer::{
    ChangePasswordData, ConnectionLookup, Customer, ForgotPasswordData, LoginCredentials,
    ProfileUpdate, RegisterData, ResetPasswordData, VerifiedConnection,
};
use accesswash_shared::models::response::ApiResponse;
use accesswash_shared::models::tenant::TenantInfo;
use accesswash_shared::tenant::TenantSlug;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::watch;

/// Snapshot of the portal's authentication state
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub customer: Option<Customer>,
    pub tenant_info: Option<TenantInfo>,
    pub loading: bool,
    pub error: Option<String>,
    pub is_authenticated: bool,
}

impl AuthState {
    fn sign_out(&mut self) {
        self.customer = None;
        self.is_authenticated = false;
    }
}

/// Process-wide authentication controller
pub struct AuthController {
    clients: Arc<ApiClients>,
    state: watch::Sender<AuthState>,
}

impl std::fmt::Debug for AuthController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthController")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl AuthController {
    pub fn new(clients: Arc<ApiClients>) -> Self {
        let (state, _) = watch::channel(AuthState::default());
        Self { clients, state }
    }

    /// Current state
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub fn clients(&self) -> &Arc<ApiClients> {
        &self.clients
    }

    fn api(&self, tenant: &TenantSlug) -> ApiClient {
        self.clients.for_tenant(tenant)
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn finish(&self) {
        self.state.send_modify(|state| state.loading = false);
    }

    /// Records a failed action and hands the error back
    fn fail<T>(&self, action: &str, err: ClientError, sign_out: bool) -> ClientResult<T> {
        tracing::error!(action, error = %err, "Portal action failed");

        let message = err.user_message();
        let sign_out = sign_out || err.is_unauthorized();
        self.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message);
            if sign_out {
                state.sign_out();
            }
        });

        Err(err)
    }

    /// Signs in with an email address or phone number
    ///
    /// On failure the identity is cleared and the message is stored in
    /// `error`.
    pub async fn login(&self, tenant: &TenantSlug, credentials: &LoginCredentials) -> ClientResult<Customer> {
        self.begin();

        match self.api(tenant).login(credentials).await {
            Ok(payload) => Ok(self.signed_in(payload.customer)),
            Err(err) => self.fail("login", err, true),
        }
    }

    /// Registers a new account and signs it in
    ///
    /// The form is validated locally before anything is sent; a local
    /// failure is reported exactly like a server one.
    pub async fn register(&self, tenant: &TenantSlug, data: &RegisterData) -> ClientResult<Customer> {
        self.begin();

        match self.api(tenant).register(data).await {
            Ok(payload) => Ok(self.signed_in(payload.customer)),
            Err(err) => self.fail("register", err, true),
        }
    }

    fn signed_in(&self, customer: Customer) -> Customer {
        self.state.send_modify(|state| {
            state.customer = Some(customer.clone());
            state.is_authenticated = true;
            state.loading = false;
            state.error = None;
        });
        customer
    }

    /// Looks up a connection ahead of registration; session fields are untouched
    pub async fn verify_connection(
        &self,
        tenant: &TenantSlug,
        lookup: &ConnectionLookup,
    ) -> ClientResult<VerifiedConnection> {
        self.begin();

        match self.api(tenant).verify_connection(lookup).await {
            Ok(connection) => {
                self.finish();
                Ok(connection)
            }
            Err(err) => self.fail("verify_connection", err, false),
        }
    }

    /// Signs out; always ends unauthenticated even if the backend is unreachable
    pub async fn logout(&self, tenant: &TenantSlug) {
        self.state.send_modify(|state| state.loading = true);

        self.api(tenant).logout().await;

        self.state.send_modify(|state| {
            state.sign_out();
            state.loading = false;
            state.error = None;
        });
    }

    /// Requests a reset email; returns the backend's message, if any
    pub async fn forgot_password(&self, tenant: &TenantSlug, email: &str) -> ClientResult<Option<String>> {
        self.begin();

        let data = ForgotPasswordData {
            email: email.trim().to_string(),
        };
        let result = self.api(tenant).forgot_password(&data).await;
        self.stateless("forgot_password", result)
    }

    pub async fn reset_password(
        &self,
        tenant: &TenantSlug,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ClientResult<Option<String>> {
        self.begin();

        let data = ResetPasswordData {
            token: token.to_string(),
            new_password: new_password.to_string(),
            new_password_confirm: confirm_password.to_string(),
        };
        let result = self.api(tenant).reset_password(&data).await;
        self.stateless("reset_password", result)
    }

    pub async fn change_password(
        &self,
        tenant: &TenantSlug,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> ClientResult<Option<String>> {
        self.begin();

        let data = ChangePasswordData {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
            new_password_confirm: confirm_password.to_string(),
        };
        let result = self.api(tenant).change_password(&data).await;
        self.stateless("change_password", result)
    }

    /// Completes a password flow without touching the identity
    fn stateless(
        &self,
        action: &str,
        result: ClientResult<ApiResponse<JsonValue>>,
    ) -> ClientResult<Option<String>> {
        match result {
            Ok(response) => {
                self.finish();
                Ok(response.message)
            }
            Err(err) => self.fail(action, err, false),
        }
    }

    /// Restores state from the stored session
    pub fn load_customer_from_storage(&self, tenant: &TenantSlug) {
        let api = self.api(tenant);
        let customer = api.current_customer();
        let is_authenticated = api.is_authenticated();

        self.state.send_modify(|state| {
            state.customer = customer;
            state.is_authenticated = is_authenticated;
            state.loading = false;
            state.error = None;
        });
    }

    /// Re-reads the stored session and reports whether it is usable
    ///
    /// Calling this repeatedly without other changes yields the same state.
    pub fn check_auth_status(&self, tenant: &TenantSlug) -> bool {
        let api = self.api(tenant);
        let customer = api.current_customer().filter(|_| api.auth_token().is_some());
        let is_authenticated = customer.is_some();

        self.state.send_if_modified(|state| {
            let next = AuthState {
                customer: customer.clone(),
                tenant_info: state.tenant_info.clone(),
                loading: false,
                error: None,
                is_authenticated,
            };
            if *state == next {
                return false;
            }
            *state = next;
            true
        });

        is_authenticated
    }

    /// Sends a partial profile update and adopts the returned customer
    pub async fn update_profile(&self, tenant: &TenantSlug, update: &ProfileUpdate) -> ClientResult<Customer> {
        self.begin();

        match self.api(tenant).update_profile(update).await {
            Ok(customer) => {
                self.state.send_modify(|state| {
                    state.customer = Some(customer.clone());
                    state.loading = false;
                });
                Ok(customer)
            }
            Err(err) => self.fail("update_profile", err, false),
        }
    }

    /// Loads tenant branding; never fails and never sets `error`
    pub async fn load_tenant_info(&self, tenant: &TenantSlug) -> TenantInfo {
        let info = self.api(tenant).tenant_info().await;
        self.state.send_modify(|state| state.tenant_info = Some(info.clone()));
        info
    }

    /// Page-load sequence: stored session, then tenant branding
    pub async fn bootstrap(&self, tenant: &TenantSlug) -> AuthState {
        self.load_customer_from_storage(tenant);
        self.load_tenant_info(tenant).await;
        self.state()
    }

    /// Applies the route guard and requests navigation when it redirects
    pub fn route(&self, tenant: &TenantSlug, path: &str) -> RouteDecision {
        let is_authenticated = self.check_auth_status(tenant);
        let decision = guard_route(tenant, path, is_authenticated);

        if let RouteDecision::Redirect(target) = &decision {
            self.clients.navigator().navigate(target);
        }

        decision
    }

    pub fn clear_error(&self) {
        self.state.send_if_modified(|state| state.error.take().is_some());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::navigation::RecordingNavigator;
    use accesswash_shared::models::customer::{AuthPayload, AuthTokens};
    use accesswash_shared::storage::{MemoryStore, TenantSession};
    use serde_json::json;

    struct Harness {
        controller: AuthController,
        store: Arc<MemoryStore>,
        navigator: Arc<RecordingNavigator>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        // Nothing listens here; any request that escapes fails fast
        let config = ClientConfig::default().with_base_url("http://127.0.0.1:9/api");
        let clients = ApiClients::new(config, store.clone(), navigator.clone()).unwrap();

        Harness {
            controller: AuthController::new(Arc::new(clients)),
            store,
            navigator,
        }
    }

    fn store_session(store: &Arc<MemoryStore>, slug: &str) {
        let session = TenantSession::new(store.clone(), TenantSlug::from(slug));
        session
            .save(&AuthPayload {
                customer: serde_json::from_value(json!({"id": "c-1", "email": "jane@example.com"}))
                    .unwrap(),
                tokens: AuthTokens {
                    access_token: "token-1".to_string(),
                    refresh_token: None,
                    expires_in: None,
                    session_id: None,
                },
            })
            .unwrap();
    }

    #[test]
    fn test_initial_state() {
        let h = harness();
        assert_eq!(h.controller.state(), AuthState::default());
    }

    #[test]
    fn test_check_auth_status_reads_storage() {
        let h = harness();
        let acme = TenantSlug::from("acme");

        assert!(!h.controller.check_auth_status(&acme));

        store_session(&h.store, "acme");
        assert!(h.controller.check_auth_status(&acme));

        let state = h.controller.state();
        assert!(state.is_authenticated);
        assert_eq!(state.customer.unwrap().id, "c-1");
    }

    #[test]
    fn test_check_auth_status_is_idempotent() {
        let h = harness();
        let acme = TenantSlug::from("acme");
        store_session(&h.store, "acme");

        let mut rx = h.controller.subscribe();
        assert!(h.controller.check_auth_status(&acme));
        let first = h.controller.state();
        rx.borrow_and_update();

        assert!(h.controller.check_auth_status(&acme));
        assert_eq!(h.controller.state(), first);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_session_of_other_tenant_is_ignored() {
        let h = harness();
        store_session(&h.store, "acme");

        h.controller.load_customer_from_storage(&TenantSlug::from("demo"));
        let state = h.controller.state();
        assert!(!state.is_authenticated);
        assert!(state.customer.is_none());
    }

    #[test]
    fn test_route_redirects_anonymous_visitor() {
        let h = harness();
        let acme = TenantSlug::from("acme");

        let decision = h.controller.route(&acme, "/acme/requests");
        assert_eq!(decision, RouteDecision::Redirect("/acme/auth/login".to_string()));
        assert_eq!(h.navigator.last().as_deref(), Some("/acme/auth/login"));

        assert_eq!(h.controller.route(&acme, "/acme/auth/login"), RouteDecision::Allow);
        assert_eq!(h.navigator.visits().len(), 1);
    }

    #[test]
    fn test_route_sends_signed_in_visitor_home() {
        let h = harness();
        let acme = TenantSlug::from("acme");
        store_session(&h.store, "acme");

        assert_eq!(
            h.controller.route(&acme, "/acme/auth/register"),
            RouteDecision::Redirect("/acme".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_validation_failure_sets_error_without_request() {
        let h = harness();
        let data = RegisterData {
            email: "not-an-email".to_string(),
            ..Default::default()
        };

        let err = h
            .controller
            .register(&TenantSlug::from("acme"), &data)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidInput { .. }));
        let state = h.controller.state();
        assert!(!state.loading);
        assert!(!state.is_authenticated);
        assert_eq!(state.error, Some(err.to_string()));
    }

    #[tokio::test]
    async fn test_logout_when_backend_unreachable() {
        let h = harness();
        let acme = TenantSlug::from("acme");
        store_session(&h.store, "acme");
        h.controller.check_auth_status(&acme);

        h.controller.logout(&acme).await;

        let state = h.controller.state();
        assert!(!state.is_authenticated);
        assert!(state.customer.is_none());
        assert!(!state.loading);
        assert!(state.error.is_none());
        assert!(h.store.is_empty());
    }

    #[test]
    fn test_clear_error() {
        let h = harness();
        h.controller.state.send_modify(|s| s.error = Some("Login failed".to_string()));

        h.controller.clear_error();
        assert!(h.controller.state().error.is_none());
    }
}
