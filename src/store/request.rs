use crate::locale::LocalizedText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

use super::lead::LeadStatus;

/// Kind of inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestType {
    /// Service/property lead (stored as a [`Lead`](super::Lead))
    Lead,
    PartnerApplication,
    PropertyListingRequest,
    ContactMessage,
    PropertyInquiry,
}

impl RequestType {
    pub const ALL: [RequestType; 5] = [
        RequestType::Lead,
        RequestType::PartnerApplication,
        RequestType::PropertyListingRequest,
        RequestType::ContactMessage,
        RequestType::PropertyInquiry,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Lead => "LEAD",
            RequestType::PartnerApplication => "PARTNER_APPLICATION",
            RequestType::PropertyListingRequest => "PROPERTY_LISTING_REQUEST",
            RequestType::ContactMessage => "CONTACT_MESSAGE",
            RequestType::PropertyInquiry => "PROPERTY_INQUIRY",
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(&self) -> LocalizedText {
        match self {
            RequestType::Lead => LocalizedText::new("service lead", "طلب خدمة"),
            RequestType::PartnerApplication => {
                LocalizedText::new("partner application", "طلب انضمام شريك")
            }
            RequestType::PropertyListingRequest => {
                LocalizedText::new("property listing request", "طلب إدراج عقار")
            }
            RequestType::ContactMessage => LocalizedText::new("contact message", "رسالة تواصل"),
            RequestType::PropertyInquiry => LocalizedText::new("property inquiry", "استفسار عن عقار"),
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace('-', "_");
        RequestType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid request type: {}. Use: lead, partner_application, property_listing_request, contact_message, property_inquiry",
                    s
                )
            })
    }
}

/// Generic request status shared by all request types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    New,
    Pending,
    Reviewed,
    Assigned,
    InProgress,
    Closed,
    Approved,
    Rejected,
}

/// Who submitted the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequesterInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl RequesterInfo {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
        }
    }
}

/// Generic request envelope.
///
/// Leads are exposed in this shape too, with the lead itself as `payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Display name of the assignee, filled in at read time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub requester_info: RequesterInfo,
    #[serde(default)]
    pub payload: Value,
}

impl Request {
    /// A fresh, unassigned request with status `new`.
    pub fn new(
        id: String,
        request_type: RequestType,
        requester_info: RequesterInfo,
        payload: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            request_type,
            status: RequestStatus::New,
            assigned_to: None,
            assigned_to_name: None,
            created_at: now,
            updated_at: now,
            requester_info,
            payload,
        }
    }

    /// JSON view used for condition evaluation.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Partial update for a request.
///
/// `lead_status` only applies to lead-backed records and takes precedence
/// over `status` there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdate {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub lead_status: Option<LeadStatus>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    /// Keys merged shallowly into the payload of non-lead requests
    #[serde(default)]
    pub payload: Option<Value>,
}
