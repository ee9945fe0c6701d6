//! Request and lead store.
//!
//! Holds non-lead requests and leads in two repositories and exposes them
//! through one generic request surface. Leads keep their own status
//! vocabulary; the generic view is a projection (see [`status`]).

mod error;
mod lead;
mod repository;
mod request;
pub mod status;
#[cfg(test)]
mod tests;

pub use error::*;
pub use lead::*;
pub use repository::*;
pub use request::*;
pub use status::{lead_status_for, project_to_request_status, StatusMappingError};

use crate::directory::{display_name, PartnerDirectory};
use crate::locale::LocalizedText;
use crate::notify::{notify_best_effort, NotificationRequest, NotificationSink};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;

impl Record for Request {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Record for Lead {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A timestamp strictly later than `previous`.
pub(crate) fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

pub(crate) fn new_request_id() -> String {
    format!("req-{}", uuid::Uuid::new_v4())
}

pub(crate) fn new_lead_id() -> String {
    format!("lead-{}", uuid::Uuid::new_v4())
}

/// Deep link for an assignee: admin back-office for staff and unknown ids,
/// partner dashboard for partners.
pub(crate) async fn request_link(
    directory: &dyn PartnerDirectory,
    assignee: &str,
    request_id: &str,
) -> String {
    let admin_link = format!("/admin/requests/{}", request_id);
    match directory.resolve_by_id(assignee).await {
        Ok(Some(partner)) if !partner.role.is_staff() => "/dashboard/leads".to_string(),
        Ok(_) => admin_link,
        Err(e) => {
            tracing::warn!(
                assignee = %assignee,
                error = %e,
                "Directory lookup failed, defaulting to admin link"
            );
            admin_link
        }
    }
}

/// Shared store for requests and leads.
pub struct RequestStore {
    requests: Arc<dyn Repository<Request>>,
    leads: Arc<dyn Repository<Lead>>,
    directory: Arc<dyn PartnerDirectory>,
    notifier: Arc<dyn NotificationSink>,
}

impl RequestStore {
    /// Create a store backed by in-memory repositories.
    pub fn new(directory: Arc<dyn PartnerDirectory>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self::with_repositories(
            Arc::new(InMemoryRepository::new()),
            Arc::new(InMemoryRepository::new()),
            directory,
            notifier,
        )
    }

    pub fn with_repositories(
        requests: Arc<dyn Repository<Request>>,
        leads: Arc<dyn Repository<Lead>>,
        directory: Arc<dyn PartnerDirectory>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            requests,
            leads,
            directory,
            notifier,
        }
    }

    pub fn directory(&self) -> &Arc<dyn PartnerDirectory> {
        &self.directory
    }

    pub fn notifier(&self) -> &Arc<dyn NotificationSink> {
        &self.notifier
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn lead_count(&self) -> usize {
        self.leads.len()
    }

    fn id_taken(&self, id: &str) -> bool {
        self.requests.contains(id) || self.leads.contains(id)
    }

    /// Persist a routed non-lead request.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateId` if the id exists in either store.
    pub fn insert_request(&self, request: Request) -> Result<(), StoreError> {
        if self.id_taken(&request.id) {
            return Err(StoreError::DuplicateId(request.id));
        }
        self.requests.put(request);
        Ok(())
    }

    /// Create a lead with status `new` and notify its owner.
    ///
    /// The owner is the manager when set, else the partner.
    pub async fn add_lead(&self, input: NewLead) -> Lead {
        let mut id = new_lead_id();
        while self.id_taken(&id) {
            id = new_lead_id();
        }
        let lead = Lead::new(id, input, Utc::now());
        self.leads.put(lead.clone());

        tracing::info!(
            lead_id = %lead.id,
            partner_id = %lead.partner_id,
            manager_id = ?lead.manager_id,
            service_type = %lead.service_type,
            "Lead created"
        );

        let (recipient, link) = match &lead.manager_id {
            Some(manager) => (manager.clone(), format!("/admin/leads/{}", lead.id)),
            None => (lead.partner_id.clone(), "/dashboard/leads".to_string()),
        };
        let message = LocalizedText::new(
            format!(
                "New {} lead from {}",
                lead.service_type, lead.customer_name
            ),
            format!(
                "طلب خدمة جديد ({}) من {}",
                lead.service_type, lead.customer_name
            ),
        );
        notify_best_effort(
            self.notifier.as_ref(),
            NotificationRequest {
                user_id: recipient,
                message,
                link,
            },
        )
        .await;

        lead
    }

    pub fn get_lead(&self, id: &str) -> Option<Lead> {
        self.leads.get(id)
    }

    /// Merge `update` into a lead and bump `updatedAt`.
    ///
    /// A new `assignedTo` or `managerId` must resolve in the directory. When
    /// the lead's effective owner changes, the new owner is notified.
    ///
    /// Returns `Ok(None)` if the id is unknown.
    pub async fn update_lead(
        &self,
        id: &str,
        update: LeadUpdate,
    ) -> Result<Option<Lead>, StoreError> {
        if !self.leads.contains(id) {
            return Ok(None);
        }
        if let Some(assigned_to) = &update.assigned_to {
            self.check_assignee("assignedTo", assigned_to).await?;
        }
        if let Some(manager_id) = &update.manager_id {
            self.check_assignee("managerId", manager_id).await?;
        }

        let mut update = Some(update);
        let mut previous = None;
        let Some(lead) = self.leads.modify(id, &mut |lead: &mut Lead| {
            previous = Some(lead.effective_assignee().to_string());
            if let Some(update) = update.take() {
                lead.apply(update);
            }
            lead.updated_at = next_timestamp(lead.updated_at);
        }) else {
            return Ok(None);
        };
        tracing::debug!(lead_id = %id, status = ?lead.status, "Lead updated");

        self.notify_if_reassigned(previous.as_deref(), &lead.to_request())
            .await;
        Ok(Some(lead))
    }

    /// Append to a lead's thread.
    ///
    /// The first partner/admin message on a `new` lead moves it to `contacted`.
    pub fn add_message_to_lead(&self, id: &str, input: NewLeadMessage) -> Option<Lead> {
        let mut input = Some(input);
        let mut transitioned = false;
        let lead = self.leads.modify(id, &mut |lead: &mut Lead| {
            let Some(input) = input.take() else {
                return;
            };
            let timestamp = next_timestamp(lead.updated_at);
            transitioned = lead.append_message(LeadMessage {
                id: format!("msg-{}", uuid::Uuid::new_v4()),
                sender: input.sender,
                sender_id: input.sender_id,
                kind: input.kind,
                content: input.content,
                timestamp,
            });
            lead.updated_at = timestamp;
        })?;

        if transitioned {
            tracing::info!(lead_id = %id, "First team response, lead marked contacted");
        }
        Some(lead)
    }

    /// Leads owned by a partner, newest first.
    pub fn leads_for_partner(&self, partner_id: &str) -> Vec<Lead> {
        self.leads_where(|lead| lead.partner_id == partner_id)
    }

    /// Leads supervised by a manager, newest first.
    pub fn leads_for_manager(&self, manager_id: &str) -> Vec<Lead> {
        self.leads_where(|lead| lead.manager_id.as_deref() == Some(manager_id))
    }

    /// All leads, newest first.
    pub fn all_leads(&self) -> Vec<Lead> {
        self.leads_where(|_| true)
    }

    fn leads_where(&self, pred: impl Fn(&Lead) -> bool) -> Vec<Lead> {
        let mut leads: Vec<Lead> = self.leads.list().into_iter().filter(|l| pred(l)).collect();
        leads.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        leads
    }

    /// Fill `assignedToName` from the directory.
    pub async fn hydrate(&self, mut request: Request) -> Request {
        request.assigned_to_name = match &request.assigned_to {
            Some(id) => Some(display_name(self.directory.as_ref(), id).await),
            None => None,
        };
        request
    }

    /// Requests and projected leads, newest first.
    pub async fn get_all_requests(&self) -> Vec<Request> {
        let mut all: Vec<Request> = self.requests.list();
        all.extend(self.leads.list().iter().map(Lead::to_request));
        all.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut hydrated = Vec::with_capacity(all.len());
        for request in all {
            hydrated.push(self.hydrate(request).await);
        }
        hydrated
    }

    pub async fn get_request_by_id(&self, id: &str) -> Option<Request> {
        let request = match self.requests.get(id) {
            Some(request) => request,
            None => self.leads.get(id)?.to_request(),
        };
        Some(self.hydrate(request).await)
    }

    /// Update a request through the generic surface.
    ///
    /// Lead-backed records translate the update into lead terms: an explicit
    /// `leadStatus` wins, otherwise `status` goes through the inverse map,
    /// which rejects `in-progress` as ambiguous. `payload` only applies to
    /// plain requests and `leadStatus` only to leads. A new `assignedTo`
    /// must resolve in the directory; a changed assignee is notified.
    ///
    /// Returns `Ok(None)` if the id is unknown.
    pub async fn update_request(
        &self,
        id: &str,
        update: RequestUpdate,
    ) -> Result<Option<Request>, StoreError> {
        if self.leads.contains(id) {
            return self.update_lead_backed_request(id, update).await;
        }
        if !self.requests.contains(id) {
            return Ok(None);
        }

        if update.lead_status.is_some() {
            return Err(StoreError::not_applicable("leadStatus", "non-lead"));
        }
        if let Some(assigned_to) = &update.assigned_to {
            self.check_assignee("assignedTo", assigned_to).await?;
        }
        let Some((previous, updated)) = self.update_plain_request(id, update) else {
            return Ok(None);
        };

        tracing::info!(
            request_id = %id,
            status = ?updated.status,
            assigned_to = ?updated.assigned_to,
            "Request updated"
        );
        self.notify_if_reassigned(previous.as_deref(), &updated).await;
        Ok(Some(self.hydrate(updated).await))
    }

    async fn update_lead_backed_request(
        &self,
        id: &str,
        update: RequestUpdate,
    ) -> Result<Option<Request>, StoreError> {
        if update.payload.is_some() {
            return Err(StoreError::not_applicable("payload", "lead"));
        }
        let status = match (update.lead_status, update.status) {
            (Some(lead_status), _) => Some(lead_status),
            (None, Some(status)) => Some(lead_status_for(status)?),
            (None, None) => None,
        };
        let lead_update = LeadUpdate {
            status,
            assigned_to: update.assigned_to,
            ..LeadUpdate::default()
        };
        let Some(lead) = self.update_lead(id, lead_update).await? else {
            return Ok(None);
        };

        let updated = lead.to_request();
        tracing::info!(
            request_id = %id,
            status = ?updated.status,
            lead_status = ?lead.status,
            assigned_to = ?updated.assigned_to,
            "Request updated"
        );
        Ok(Some(self.hydrate(updated).await))
    }

    fn update_plain_request(
        &self,
        id: &str,
        update: RequestUpdate,
    ) -> Option<(Option<String>, Request)> {
        let mut update = Some(update);
        let mut previous = None;
        let request = self.requests.modify(id, &mut |request: &mut Request| {
            let Some(update) = update.take() else {
                return;
            };
            previous = request.assigned_to.clone();
            if let Some(status) = update.status {
                request.status = status;
            }
            if let Some(assigned_to) = update.assigned_to {
                request.assigned_to = Some(assigned_to);
            }
            if let Some(patch) = update.payload {
                merge_payload(&mut request.payload, patch);
            }
            request.updated_at = next_timestamp(request.updated_at);
        })?;
        Some((previous, request))
    }

    /// Reject blank ids and ids the directory does not know.
    ///
    /// A failing directory does not block the update.
    async fn check_assignee(&self, field: &str, id: &str) -> Result<(), StoreError> {
        if id.trim().is_empty() {
            return Err(StoreError::invalid_assignee(field, id));
        }
        match self.directory.resolve_by_id(id).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(StoreError::invalid_assignee(field, id)),
            Err(e) => {
                tracing::warn!(
                    field = %field,
                    assignee = %id,
                    error = %e,
                    "Directory lookup failed, accepting assignee unverified"
                );
                Ok(())
            }
        }
    }

    async fn notify_if_reassigned(&self, previous: Option<&str>, request: &Request) {
        if let Some(assignee) = &request.assigned_to {
            if previous != Some(assignee.as_str()) {
                self.notify_reassignment(request, assignee).await;
            }
        }
    }

    async fn notify_reassignment(&self, request: &Request, assignee: &str) {
        let link = request_link(self.directory.as_ref(), assignee, &request.id).await;
        let label = request.request_type.label();
        notify_best_effort(
            self.notifier.as_ref(),
            NotificationRequest {
                user_id: assignee.to_string(),
                message: LocalizedText::new(
                    format!(
                        "A {} from {} was assigned to you",
                        label.en, request.requester_info.name
                    ),
                    format!(
                        "تم تعيين {} من {} إليك",
                        label.ar, request.requester_info.name
                    ),
                ),
                link,
            },
        )
        .await;
    }
}

/// Shallow merge of object keys; non-object patches replace the payload.
fn merge_payload(payload: &mut Value, patch: Value) {
    match (payload, patch) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                target.insert(key, value);
            }
        }
        (target, patch) => *target = patch,
    }
}
