//! Common test utilities for integration tests
//!
//! Every test gets its own mock backend, in-memory session store, and
//! recording navigator, so tests never share sessions.

#![allow(dead_code)]

use accesswash_client::api::{ApiClient, ApiClients};
use accesswash_client::config::ClientConfig;
use accesswash_client::controller::AuthController;
use accesswash_client::navigation::RecordingNavigator;
use accesswash_shared::models::customer::{AuthPayload, AuthTokens};
use accesswash_shared::storage::{MemoryStore, TenantSession};
use accesswash_shared::tenant::TenantSlug;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

/// Test context containing all necessary resources
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub clients: Arc<ApiClients>,
    pub controller: AuthController,
}

impl TestContext {
    /// Creates a context whose tenants all talk to a fresh mock backend
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let config = ClientConfig {
            request_timeout_secs: 2,
            ..ClientConfig::default()
        }
        .with_base_url(format!("{}/api", server.uri()));

        let store = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let clients = Arc::new(
            ApiClients::new(config, store.clone(), navigator.clone()).expect("client should build"),
        );
        let controller = AuthController::new(clients.clone());

        TestContext {
            server,
            store,
            navigator,
            clients,
            controller,
        }
    }

    pub fn api(&self, tenant: &str) -> ApiClient {
        self.clients.for_tenant(&TenantSlug::from(tenant))
    }

    pub fn session(&self, tenant: &str) -> TenantSession {
        TenantSession::new(self.store.clone(), TenantSlug::from(tenant))
    }

    /// Stores a signed-in session for `tenant` with the given token
    pub fn sign_in(&self, tenant: &str, token: &str) {
        self.session(tenant)
            .save(&AuthPayload {
                customer: serde_json::from_value(customer_json()).expect("valid customer"),
                tokens: AuthTokens {
                    access_token: token.to_string(),
                    refresh_token: Some(format!("{}-refresh", token)),
                    expires_in: Some(3600),
                    session_id: None,
                },
            })
            .expect("session should save");
    }

    /// Requests the mock backend has received so far
    pub async fn requests(&self) -> Vec<wiremock::Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}

pub fn customer_json() -> Value {
    json!({
        "id": "c-1",
        "email": "jane@example.com",
        "phone_number": "+254712345678",
        "first_name": "Jane",
        "last_name": "Wanjiru",
        "full_name": "Jane Wanjiru",
        "account_number": "ACC-001",
        "property_address": "12 Riverside Dr",
        "service_type": "residential",
        "language": "en",
        "email_verified": true,
        "phone_verified": true,
        "created_at": "2024-03-01T08:00:00Z"
    })
}

pub fn login_response(token: &str) -> Value {
    json!({
        "success": true,
        "message": "Login successful",
        "data": {
            "customer": customer_json(),
            "tokens": {
                "access_token": token,
                "refresh_token": "refresh-1",
                "expires_in": 3600
            }
        }
    })
}

pub fn service_request_json(id: &str) -> Value {
    json!({
        "id": id,
        "request_number": "SR-2024-00042",
        "customer": "c-1",
        "issue_type": "no_water",
        "title": "No water since morning",
        "description": "Taps dry since 6am",
        "urgency": "high",
        "status": "open",
        "reported_location": "12 Riverside Dr",
        "location_coordinates": {"type": "Point", "coordinates": [36.8219, -1.2921]},
        "created_at": "2024-03-02T06:30:00Z",
        "updated_at": "2024-03-02T06:30:00Z",
        "priority_score": 7.5
    })
}

/// Value of the Authorization header of a recorded request
pub fn authorization(request: &wiremock::Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
