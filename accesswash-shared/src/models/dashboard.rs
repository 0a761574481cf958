//! Dashboard aggregate (`GET /portal/dashboard/`)

use super::customer::Customer;
use super::service_request::ServiceRequest;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Everything the landing page shows in one response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub customer: Customer,
    pub account_summary: AccountSummary,

    #[serde(default)]
    pub recent_requests: Vec<ServiceRequest>,

    #[serde(default)]
    pub service_alerts: Vec<ServiceAlert>,

    #[serde(default)]
    pub quick_actions: Vec<QuickAction>,
}

impl DashboardData {
    /// Tickets from the recent list that are still being worked on
    pub fn active_requests(&self) -> impl Iterator<Item = &ServiceRequest> {
        self.recent_requests.iter().filter(|r| r.status.is_active())
    }
}

/// Billing account overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_number: String,

    #[serde(default)]
    pub service_address: String,

    #[serde(default)]
    pub service_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_date: Option<NaiveDate>,

    #[serde(default)]
    pub account_status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_number: Option<String>,
}

/// Planned outage, quality notice, and the like
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Shortcut tile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickAction {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub icon: String,

    pub url: String,

    #[serde(default)]
    pub primary: bool,
}
