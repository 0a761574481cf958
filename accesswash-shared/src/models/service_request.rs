//! Service requests (support tickets)
//!
//! Tickets are owned by the backend's support module. The portal lists them,
//! opens new ones, comments on them, rates resolved ones, and attaches photos.
//! Status transitions happen server-side only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// What the customer is reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    NoWater,
    LowPressure,
    PipeBurst,
    WaterQuality,
    MeterProblem,
    BillingInquiry,
    ConnectionRequest,
    Disconnection,
    /// Anything else, including issue types this client does not know yet
    #[serde(other)]
    Other,
}

impl IssueType {
    pub const ALL: [IssueType; 9] = [
        IssueType::NoWater,
        IssueType::LowPressure,
        IssueType::PipeBurst,
        IssueType::WaterQuality,
        IssueType::MeterProblem,
        IssueType::BillingInquiry,
        IssueType::ConnectionRequest,
        IssueType::Disconnection,
        IssueType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::NoWater => "no_water",
            IssueType::LowPressure => "low_pressure",
            IssueType::PipeBurst => "pipe_burst",
            IssueType::WaterQuality => "water_quality",
            IssueType::MeterProblem => "meter_problem",
            IssueType::BillingInquiry => "billing_inquiry",
            IssueType::ConnectionRequest => "connection_request",
            IssueType::Disconnection => "disconnection",
            IssueType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueType::NoWater => "No Water Supply",
            IssueType::LowPressure => "Low Water Pressure",
            IssueType::PipeBurst => "Pipe Burst/Leak",
            IssueType::WaterQuality => "Water Quality Issue",
            IssueType::MeterProblem => "Meter Problem",
            IssueType::BillingInquiry => "Billing Inquiry",
            IssueType::ConnectionRequest => "New Connection Request",
            IssueType::Disconnection => "Service Disconnection",
            IssueType::Other => "Other Issue",
        }
    }

    /// Parses the wire value
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ticket lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Open,
    Acknowledged,
    Assigned,
    InProgress,
    OnHold,
    Resolved,
    Closed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Open => "open",
            RequestStatus::Acknowledged => "acknowledged",
            RequestStatus::Assigned => "assigned",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::OnHold => "on_hold",
            RequestStatus::Resolved => "resolved",
            RequestStatus::Closed => "closed",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestStatus::Open => "Open",
            RequestStatus::Acknowledged => "Acknowledged",
            RequestStatus::Assigned => "Assigned",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::OnHold => "On Hold",
            RequestStatus::Resolved => "Resolved",
            RequestStatus::Closed => "Closed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether the ticket still needs work from the utility
    pub fn is_active(&self) -> bool {
        !matches!(
            self,
            RequestStatus::Resolved | RequestStatus::Closed | RequestStatus::Cancelled
        )
    }

    /// Ratings are only accepted once the utility has finished
    pub fn accepts_rating(&self) -> bool {
        matches!(self, RequestStatus::Resolved | RequestStatus::Closed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How quickly the utility should respond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Emergency,
    High,
    #[default]
    Standard,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Emergency => "emergency",
            Urgency::High => "high",
            Urgency::Standard => "standard",
            Urgency::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Urgency::Emergency => "Emergency",
            Urgency::High => "High",
            Urgency::Standard => "Standard",
            Urgency::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "emergency" => Some(Urgency::Emergency),
            "high" => Some(Urgency::High),
            "standard" => Some(Urgency::Standard),
            "low" => Some(Urgency::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Latitude/longitude as entered by the customer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// GeoJSON point as stored by the backend (`[lng, lat]` order)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoKind,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    Point,
}

impl From<Coordinates> for GeoPoint {
    fn from(c: Coordinates) -> Self {
        GeoPoint {
            kind: GeoKind::Point,
            coordinates: [c.lng, c.lat],
        }
    }
}

impl From<GeoPoint> for Coordinates {
    fn from(p: GeoPoint) -> Self {
        Coordinates {
            lng: p.coordinates[0],
            lat: p.coordinates[1],
        }
    }
}

/// Support ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: String,

    /// Human-facing reference ("SR-2024-00042")
    #[serde(default)]
    pub request_number: String,

    /// Owning customer id
    #[serde(default)]
    pub customer: String,

    pub issue_type: IssueType,
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub urgency: Urgency,
    pub status: RequestStatus,

    #[serde(default)]
    pub reported_location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<GeoPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_category: Option<String>,

    /// 1-5 stars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_rating: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_feedback: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_response_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_resolution_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub priority_score: f64,
}

impl ServiceRequest {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location_coordinates.map(Coordinates::from)
    }
}

/// New ticket as filled in by the customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewServiceRequest {
    pub issue_type: IssueType,

    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub urgency: Urgency,

    #[validate(length(min = 1, message = "Location is required"))]
    pub reported_location: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<Coordinates>,
}

/// Wire body for `POST /support/requests/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateServiceRequestBody {
    pub issue_type: IssueType,
    pub title: String,
    pub description: String,
    pub urgency: Urgency,
    pub reported_location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_coordinates: Option<GeoPoint>,
}

impl From<NewServiceRequest> for CreateServiceRequestBody {
    fn from(req: NewServiceRequest) -> Self {
        Self {
            issue_type: req.issue_type,
            title: req.title,
            description: req.description,
            urgency: req.urgency,
            reported_location: req.reported_location,
            location_coordinates: req.location_coordinates.map(GeoPoint::from),
        }
    }
}

/// Comment thread entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequestComment {
    pub id: String,

    #[serde(default)]
    pub service_request: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_customer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_staff: Option<String>,

    pub comment: String,

    #[serde(default)]
    pub is_internal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_from: Option<RequestStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_to: Option<RequestStatus>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Satisfaction rating for a resolved ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Rating {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enum_wire_values() {
        assert_eq!(serde_json::to_value(RequestStatus::InProgress).unwrap(), json!("in_progress"));
        assert_eq!(serde_json::to_value(IssueType::NoWater).unwrap(), json!("no_water"));
        assert_eq!(serde_json::to_value(Urgency::Emergency).unwrap(), json!("emergency"));
    }

    #[test]
    fn test_unknown_issue_type_maps_to_other() {
        let issue: IssueType = serde_json::from_value(json!("sewer_overflow")).unwrap();
        assert_eq!(issue, IssueType::Other);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RequestStatus::OnHold.to_string(), "On Hold");
        assert_eq!(IssueType::PipeBurst.to_string(), "Pipe Burst/Leak");
        assert_eq!(Urgency::Low.label(), "Low");
        assert_eq!(IssueType::parse("meter_problem"), Some(IssueType::MeterProblem));
        assert_eq!(Urgency::parse("urgent"), None);
    }

    #[test]
    fn test_status_predicates() {
        assert!(RequestStatus::Open.is_active());
        assert!(!RequestStatus::Cancelled.is_active());
        assert!(RequestStatus::Resolved.accepts_rating());
        assert!(!RequestStatus::InProgress.accepts_rating());
    }

    #[test]
    fn test_create_body_converts_coordinates_to_geojson() {
        let body = CreateServiceRequestBody::from(NewServiceRequest {
            issue_type: IssueType::PipeBurst,
            title: "Burst main".to_string(),
            description: "Water everywhere".to_string(),
            urgency: Urgency::Emergency,
            reported_location: "Moi Avenue".to_string(),
            location_coordinates: Some(Coordinates { lat: -1.28, lng: 36.82 }),
        });

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["location_coordinates"]["type"], "Point");
        assert_eq!(value["location_coordinates"]["coordinates"], json!([36.82, -1.28]));
    }

    #[test]
    fn test_create_body_omits_missing_coordinates() {
        let body = CreateServiceRequestBody::from(NewServiceRequest {
            issue_type: IssueType::LowPressure,
            title: "Weak flow".to_string(),
            description: "Since Monday".to_string(),
            urgency: Urgency::Standard,
            reported_location: "Block C".to_string(),
            location_coordinates: None,
        });

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("location_coordinates").is_none());
    }

    #[test]
    fn test_service_request_deserialize() {
        let req: ServiceRequest = serde_json::from_value(json!({
            "id": "sr-1",
            "request_number": "SR-2024-00042",
            "customer": "c-1",
            "issue_type": "no_water",
            "title": "No water since morning",
            "description": "Taps are dry",
            "urgency": "high",
            "status": "acknowledged",
            "reported_location": "12 Riverside Dr",
            "location_coordinates": {"type": "Point", "coordinates": [36.8, -1.3]},
            "created_at": "2024-03-01T08:00:00Z",
            "updated_at": "2024-03-01T09:30:00Z",
            "priority_score": 72.5
        }))
        .unwrap();

        assert_eq!(req.status, RequestStatus::Acknowledged);
        assert_eq!(req.coordinates(), Some(Coordinates { lat: -1.3, lng: 36.8 }));
        assert!(req.customer_rating.is_none());
    }

    #[test]
    fn test_rating_range() {
        assert!(Rating { rating: 5, feedback: None }.validate().is_ok());
        assert!(Rating { rating: 0, feedback: None }.validate().is_err());
        assert!(Rating { rating: 6, feedback: None }.validate().is_err());
    }
}
