//! Request routing and dispatch
//!
//! The dispatcher turns submitted request data into a persisted, assigned
//! request. Non-lead requests walk the ordered rule set and take the first
//! rule whose conditions all hold; when none does, a static per-type
//! fallback applies. Leads skip the rule engine entirely and go to the
//! partner or manager named in their payload.
//!
//! Routing is total: a missing rule source or directory degrades to the
//! fallback and a raw id, it never fails the submission.

use std::sync::Arc;

pub mod condition;
pub mod error;
pub mod rules;

pub use condition::{evaluate, Condition, Operator};
pub use error::{DispatchError, RuleError};
pub use rules::{RoutingRule, RuleAction, RuleSource, RuleStore};

use crate::directory::PartnerDirectory;
use crate::locale::LocalizedText;
use crate::notify::{notify_best_effort, NotificationRequest, NotificationSink};
use crate::store::{
    new_request_id, request_link, NewLead, Request, RequestStatus, RequestStore, RequestType,
    RequesterInfo,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default assignees used when no rule matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackAssignees {
    /// Receives partner applications
    pub partner_relations: String,
    /// Receives listing requests, inquiries and contact messages
    pub customer_relations: String,
}

impl FallbackAssignees {
    /// Fallback for a type. Leads have none; they always carry an explicit owner.
    pub fn for_type(&self, request_type: RequestType) -> Option<&str> {
        match request_type {
            RequestType::PartnerApplication => Some(&self.partner_relations),
            RequestType::PropertyListingRequest
            | RequestType::PropertyInquiry
            | RequestType::ContactMessage => Some(&self.customer_relations),
            RequestType::Lead => None,
        }
    }
}

impl Default for FallbackAssignees {
    fn default() -> Self {
        Self {
            partner_relations: "partner-relations-manager-1".to_string(),
            customer_relations: "customer-relations-manager-1".to_string(),
        }
    }
}

/// How an assignee was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoutingDecision {
    /// First fully-matching active rule
    Rule { rule_id: String, assign_to: String },
    /// No rule matched; static default for the type
    Fallback { assign_to: String },
    /// Lead routed to the owner named in its payload
    Direct { assign_to: String },
}

impl RoutingDecision {
    pub fn assign_to(&self) -> &str {
        match self {
            RoutingDecision::Rule { assign_to, .. }
            | RoutingDecision::Fallback { assign_to }
            | RoutingDecision::Direct { assign_to } => assign_to,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            RoutingDecision::Rule { .. } => "rule",
            RoutingDecision::Fallback { .. } => "fallback",
            RoutingDecision::Direct { .. } => "direct",
        }
    }
}

/// Creates requests and decides who owns them.
pub struct Dispatcher {
    rules: Arc<dyn RuleSource>,
    fallbacks: FallbackAssignees,
    store: Arc<RequestStore>,
}

impl Dispatcher {
    pub fn new(
        rules: Arc<dyn RuleSource>,
        fallbacks: FallbackAssignees,
        store: Arc<RequestStore>,
    ) -> Self {
        Self {
            rules,
            fallbacks,
            store,
        }
    }

    pub fn store(&self) -> &Arc<RequestStore> {
        &self.store
    }

    pub fn fallbacks(&self) -> &FallbackAssignees {
        &self.fallbacks
    }

    fn directory(&self) -> &dyn PartnerDirectory {
        self.store.directory().as_ref()
    }

    fn notifier(&self) -> &dyn NotificationSink {
        self.store.notifier().as_ref()
    }

    /// Create, route, persist and announce a request.
    ///
    /// # Errors
    ///
    /// Only input validation fails: blank requester name or phone, or a lead
    /// payload without `partnerId`. Routing and notification problems are
    /// logged and absorbed.
    pub async fn create_request(
        &self,
        request_type: RequestType,
        requester_info: RequesterInfo,
        payload: Value,
    ) -> Result<Request, DispatchError> {
        validate_requester(&requester_info)?;

        if request_type == RequestType::Lead {
            return self.create_lead(requester_info, payload).await;
        }

        let mut request = Request::new(
            new_request_id(),
            request_type,
            requester_info,
            payload,
            Utc::now(),
        );
        let decision = self.route(&request);
        request.assigned_to = Some(decision.assign_to().to_string());
        if let RoutingDecision::Rule { .. } = decision {
            request.status = RequestStatus::Assigned;
        }

        self.store.insert_request(request.clone())?;

        metrics::counter!(
            "triage_requests_total",
            "type" => request_type.as_str(),
            "outcome" => decision.outcome()
        )
        .increment(1);
        tracing::info!(
            request_id = %request.id,
            request_type = %request_type,
            assigned_to = %decision.assign_to(),
            outcome = decision.outcome(),
            "Request created"
        );

        self.announce(&request, decision.assign_to()).await;
        Ok(self.store.hydrate(request).await)
    }

    /// Decide where a request would go, without creating it.
    pub fn preview(
        &self,
        request_type: RequestType,
        requester_info: RequesterInfo,
        payload: Value,
    ) -> Result<RoutingDecision, DispatchError> {
        validate_requester(&requester_info)?;

        if request_type == RequestType::Lead {
            let lead = lead_input(&requester_info, payload)?;
            let assign_to = lead.manager_id.unwrap_or(lead.partner_id);
            return Ok(RoutingDecision::Direct { assign_to });
        }
        let request = Request::new(
            String::new(),
            request_type,
            requester_info,
            payload,
            Utc::now(),
        );
        Ok(self.route(&request))
    }

    /// First matching active rule, else the type's fallback.
    fn route(&self, request: &Request) -> RoutingDecision {
        let view = request.to_value();
        let rules = match self.rules.active_rules() {
            Ok(rules) => rules,
            Err(e) => {
                tracing::warn!(error = %e, "Rule source unavailable, using fallback assignee");
                Vec::new()
            }
        };

        if let Some(rule) = rules.iter().find(|rule| rule.matches(&view)) {
            tracing::debug!(
                rule_id = %rule.id,
                assign_to = %rule.action.assign_to,
                "Routing rule matched"
            );
            return RoutingDecision::Rule {
                rule_id: rule.id.clone(),
                assign_to: rule.action.assign_to.clone(),
            };
        }

        // Non-lead types always have a fallback
        let assign_to = self
            .fallbacks
            .for_type(request.request_type)
            .unwrap_or(&self.fallbacks.customer_relations)
            .to_string();
        tracing::debug!(
            request_type = %request.request_type,
            assign_to = %assign_to,
            "No routing rule matched, using fallback"
        );
        RoutingDecision::Fallback { assign_to }
    }

    async fn create_lead(
        &self,
        requester_info: RequesterInfo,
        payload: Value,
    ) -> Result<Request, DispatchError> {
        let input = lead_input(&requester_info, payload)?;
        let lead = self.store.add_lead(input).await;
        metrics::counter!(
            "triage_requests_total",
            "type" => RequestType::Lead.as_str(),
            "outcome" => "direct"
        )
        .increment(1);
        Ok(self.store.hydrate(lead.to_request()).await)
    }

    async fn announce(&self, request: &Request, assignee: &str) {
        let link = request_link(self.directory(), assignee, &request.id).await;
        let label = request.request_type.label();
        let name = &request.requester_info.name;
        notify_best_effort(
            self.notifier(),
            NotificationRequest {
                user_id: assignee.to_string(),
                message: LocalizedText::new(
                    format!("New {} from {}", label.en, name),
                    format!("{} جديد من {}", label.ar, name),
                ),
                link,
            },
        )
        .await;
    }
}

fn validate_requester(info: &RequesterInfo) -> Result<(), DispatchError> {
    if info.name.trim().is_empty() {
        return Err(DispatchError::validation(
            "requesterInfo.name",
            "name is required",
        ));
    }
    if info.phone.trim().is_empty() {
        return Err(DispatchError::validation(
            "requesterInfo.phone",
            "phone is required",
        ));
    }
    Ok(())
}

/// Read lead fields from a payload, defaulting the customer to the requester.
fn lead_input(requester_info: &RequesterInfo, payload: Value) -> Result<NewLead, DispatchError> {
    let mut input: NewLead = serde_json::from_value(payload)
        .map_err(|e| DispatchError::validation("payload", &e.to_string()))?;
    if input.partner_id.trim().is_empty() {
        return Err(DispatchError::validation(
            "payload.partnerId",
            "partnerId is required for leads",
        ));
    }
    if input.manager_id.as_deref().is_some_and(|m| m.trim().is_empty()) {
        input.manager_id = None;
    }
    if input.customer_name.is_empty() {
        input.customer_name = requester_info.name.clone();
    }
    if input.customer_phone.is_empty() {
        input.customer_phone = requester_info.phone.clone();
    }
    Ok(input)
}
