use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::request::{Request, RequestType, RequesterInfo};
use super::status::project_to_request_status;

/// Lead-native status.
///
/// Nominal lifecycle: `new → contacted → {site-visit, quoted} → in-progress
/// → completed`, or `cancelled` from any non-terminal state. Transitions
/// are not guarded; authorized callers may set any status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadStatus {
    New,
    Contacted,
    SiteVisit,
    Quoted,
    InProgress,
    Completed,
    Cancelled,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::SiteVisit,
        LeadStatus::Quoted,
        LeadStatus::InProgress,
        LeadStatus::Completed,
        LeadStatus::Cancelled,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeadStatus::Completed | LeadStatus::Cancelled)
    }
}

/// Author of a thread entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSender {
    Client,
    Partner,
    Admin,
    System,
}

impl MessageSender {
    /// Partner and admin messages count as a team response.
    pub fn is_team(&self) -> bool {
        matches!(self, MessageSender::Partner | MessageSender::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Visible to the customer
    #[default]
    Message,
    /// Internal note
    Note,
}

/// One entry of a lead's conversation thread. Never mutated once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadMessage {
    pub id: String,
    pub sender: MessageSender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Input for appending to a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLeadMessage {
    pub sender: MessageSender,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    pub content: String,
}

impl NewLeadMessage {
    pub fn new(sender: MessageSender, content: impl Into<String>) -> Self {
        Self {
            sender,
            sender_id: None,
            kind: MessageKind::Message,
            content: content.into(),
        }
    }
}

/// A service/property lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub partner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub service_type: String,
    pub service_title: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_notes: String,
    pub contact_time: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,
    #[serde(default)]
    pub messages: Vec<LeadMessage>,
}

/// Input for creating a lead.
///
/// Deserializable from a `LEAD` request payload; customer name and phone
/// fall back to the requester info when the payload omits them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub partner_id: String,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub service_title: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_notes: String,
    #[serde(default)]
    pub contact_time: String,
    #[serde(default)]
    pub property_id: Option<String>,
}

/// Partial update for a lead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadUpdate {
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub manager_id: Option<String>,
    #[serde(default)]
    pub service_title: Option<String>,
    #[serde(default)]
    pub customer_notes: Option<String>,
    #[serde(default)]
    pub contact_time: Option<String>,
}

impl LeadUpdate {
    pub fn status(status: LeadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Lead {
    pub fn new(id: String, input: NewLead, now: DateTime<Utc>) -> Self {
        Self {
            id,
            partner_id: input.partner_id,
            manager_id: input.manager_id,
            assigned_to: None,
            service_type: input.service_type,
            service_title: input.service_title,
            customer_name: input.customer_name,
            customer_phone: input.customer_phone,
            customer_notes: input.customer_notes,
            contact_time: input.contact_time,
            status: LeadStatus::New,
            created_at: now,
            updated_at: now,
            property_id: input.property_id,
            messages: Vec::new(),
        }
    }

    /// Who owns the lead right now: explicit assignee, then manager, then partner.
    pub fn effective_assignee(&self) -> &str {
        self.assigned_to
            .as_deref()
            .or(self.manager_id.as_deref())
            .unwrap_or(&self.partner_id)
    }

    /// Merge set fields of `update`. Does not touch `updated_at`.
    pub(crate) fn apply(&mut self, update: LeadUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(assigned_to) = update.assigned_to {
            self.assigned_to = Some(assigned_to);
        }
        if let Some(manager_id) = update.manager_id {
            self.manager_id = Some(manager_id);
        }
        if let Some(title) = update.service_title {
            self.service_title = title;
        }
        if let Some(notes) = update.customer_notes {
            self.customer_notes = notes;
        }
        if let Some(contact_time) = update.contact_time {
            self.contact_time = contact_time;
        }
    }

    /// Append to the thread. A team message on a `new` lead marks it `contacted`.
    ///
    /// Returns true when the status changed.
    pub(crate) fn append_message(&mut self, message: LeadMessage) -> bool {
        let first_response = self.status == LeadStatus::New && message.sender.is_team();
        self.messages.push(message);
        if first_response {
            self.status = LeadStatus::Contacted;
        }
        first_response
    }

    /// Generic request view of this lead.
    pub fn to_request(&self) -> Request {
        Request {
            id: self.id.clone(),
            request_type: RequestType::Lead,
            status: project_to_request_status(self.status),
            assigned_to: Some(self.effective_assignee().to_string()),
            assigned_to_name: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
            requester_info: RequesterInfo::new(&self.customer_name, &self.customer_phone),
            payload: serde_json::to_value(self).unwrap_or_default(),
        }
    }
}
