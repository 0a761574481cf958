//! Authentication endpoints (`/portal/auth/...`)

use super::{expect_data, ApiClient};
use crate::error::{ClientError, ClientResult};
use accesswash_shared::models::customer::{
    AuthEnvelope, AuthPayload, ChangePasswordData, ConnectionLookup, ForgotPasswordData,
    LoginCredentials, RegisterData, ResetPasswordData, VerifiedConnection,
};
use accesswash_shared::models::response::ApiResponse;
use reqwest::Method;
use serde_json::Value as JsonValue;
use validator::Validate;

impl ApiClient {
    /// Signs in and persists the returned session
    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthPayload> {
        credentials.validate()?;

        let envelope: AuthEnvelope = self
            .send_json(Method::POST, "/portal/auth/login/", credentials, "Login failed")
            .await?;
        self.store_auth(envelope, "Login failed")
    }

    /// Creates an account and persists the returned session
    ///
    /// The form is validated locally first; nothing is sent if it fails.
    pub async fn register(&self, data: &RegisterData) -> ClientResult<AuthPayload> {
        data.validate()?;

        let envelope: AuthEnvelope = self
            .send_json(Method::POST, "/portal/auth/register/", data, "Registration failed")
            .await?;
        self.store_auth(envelope, "Registration failed")
    }

    fn store_auth(&self, envelope: AuthEnvelope, fallback: &str) -> ClientResult<AuthPayload> {
        let message = envelope.message.clone();
        let payload = envelope
            .into_payload()
            .ok_or_else(|| ClientError::Rejected(message.unwrap_or_else(|| fallback.to_string())))?;

        self.session().save(&payload)?;
        tracing::info!(tenant = %self.tenant(), customer_id = %payload.customer.id, "Signed in");

        Ok(payload)
    }

    /// Notifies the backend, then clears the stored session regardless
    pub async fn logout(&self) {
        if let Err(err) = self.post_empty("/portal/auth/logout/", "Logout failed").await {
            tracing::warn!(tenant = %self.tenant(), error = %err, "Logout request failed, clearing session anyway");
        }

        self.clear_session();
    }

    pub async fn forgot_password(&self, data: &ForgotPasswordData) -> ClientResult<ApiResponse<JsonValue>> {
        data.validate()?;
        self.send_json(
            Method::POST,
            "/portal/auth/forgot-password/",
            data,
            "Failed to send reset email",
        )
        .await
    }

    pub async fn reset_password(&self, data: &ResetPasswordData) -> ClientResult<ApiResponse<JsonValue>> {
        data.validate()?;
        self.send_json(
            Method::POST,
            "/portal/auth/reset-password/",
            data,
            "Password reset failed",
        )
        .await
    }

    pub async fn change_password(&self, data: &ChangePasswordData) -> ClientResult<ApiResponse<JsonValue>> {
        data.validate()?;
        self.send_json(
            Method::POST,
            "/portal/auth/change-password/",
            data,
            "Password change failed",
        )
        .await
    }

    /// Looks up a water connection ahead of registration
    pub async fn verify_connection(&self, lookup: &ConnectionLookup) -> ClientResult<VerifiedConnection> {
        const FALLBACK: &str = "Connection verification failed";

        lookup.validate()?;
        let response: ApiResponse<VerifiedConnection> = self
            .send_json(Method::POST, "/portal/auth/verify-connection/", lookup, FALLBACK)
            .await?;
        expect_data(response, FALLBACK)
    }
}
