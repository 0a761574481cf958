//! Account endpoints (`/portal/...`) and tenant metadata

use super::{expect_data, ApiClient, MaybeEnveloped};
use crate::error::{ClientError, ClientResult};
use accesswash_shared::models::customer::{Customer, ProfileUpdate};
use accesswash_shared::models::dashboard::DashboardData;
use accesswash_shared::models::response::{ApiResponse, Listing};
use accesswash_shared::models::session::PortalSession;
use accesswash_shared::models::tenant::TenantInfo;
use reqwest::Method;
use validator::Validate;

impl ApiClient {
    pub async fn dashboard(&self) -> ClientResult<DashboardData> {
        const FALLBACK: &str = "Failed to load dashboard";

        let response: ApiResponse<DashboardData> =
            self.get_json("/portal/dashboard/", FALLBACK).await?;
        expect_data(response, FALLBACK)
    }

    pub async fn profile(&self) -> ClientResult<Customer> {
        const FALLBACK: &str = "Failed to load profile";

        let response: ApiResponse<Customer> = self.get_json("/portal/profile/", FALLBACK).await?;
        expect_data(response, FALLBACK)
    }

    /// Sends a partial profile update
    ///
    /// The customer returned by the backend replaces the stored snapshot.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<Customer> {
        const FALLBACK: &str = "Failed to update profile";

        if update.is_empty() {
            return Err(ClientError::InvalidInput {
                message: "Nothing to update".to_string(),
                fields: Default::default(),
            });
        }
        update.validate()?;

        let response: ApiResponse<Customer> = self
            .send_json(Method::PUT, "/portal/profile/", update, FALLBACK)
            .await?;
        let customer = expect_data(response, FALLBACK)?;

        self.session().set_customer(&customer)?;
        Ok(customer)
    }

    /// Devices currently signed in to this account
    pub async fn sessions(&self) -> ClientResult<Vec<PortalSession>> {
        const FALLBACK: &str = "Failed to load sessions";

        let response: ApiResponse<Listing<PortalSession>> =
            self.get_json("/portal/sessions/", FALLBACK).await?;
        expect_data(response, FALLBACK).map(Listing::into_vec)
    }

    /// Tenant branding, or a synthesized default if the backend cannot supply it
    pub async fn tenant_info(&self) -> TenantInfo {
        const FALLBACK: &str = "Failed to load tenant info";

        let info = self
            .get_json::<MaybeEnveloped<TenantInfo>>("/core/tenant-info/", FALLBACK)
            .await
            .and_then(|body| body.into_result(FALLBACK));

        match info {
            Ok(info) => info,
            Err(err) => {
                tracing::warn!(tenant = %self.tenant(), error = %err, "Using default tenant info");
                TenantInfo::fallback(self.tenant())
            }
        }
    }
}
