//! Shared test utilities for triage integration tests.
//!
//! Builders for directories, rule stores and a fully wired router, plus
//! small HTTP helpers for driving it.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use triage::api::{create_router, AppState};
use triage::config::TriageConfig;
use triage::directory::{Partner, PartnerRole, StaticDirectory};
use triage::locale::LocalizedText;
use triage::notify::InMemorySink;
use triage::routing::{Condition, Dispatcher, FallbackAssignees, Operator, RoutingRule, RuleStore};
use triage::store::{RequestStore, RequesterInfo};

// =============================================================================
// Well-Known Ids
// =============================================================================

pub const ADMIN: &str = "admin-1";
pub const LISTINGS_MANAGER: &str = "listings-manager-1";
pub const CUSTOMER_RELATIONS: &str = "customer-relations-manager-1";
pub const PARTNER_RELATIONS: &str = "partner-relations-manager-1";
pub const SERVICE_MANAGER: &str = "service-manager-1";
pub const PARTNER: &str = "el-mottaheda-group";

// =============================================================================
// Builders
// =============================================================================

pub fn make_directory() -> Arc<StaticDirectory> {
    Arc::new(StaticDirectory::from_partners([
        Partner::new(ADMIN, "Platform Admin", PartnerRole::Admin),
        Partner::new(LISTINGS_MANAGER, "Listings Desk", PartnerRole::Manager),
        Partner::new(CUSTOMER_RELATIONS, "Customer Relations", PartnerRole::Manager),
        Partner::new(PARTNER_RELATIONS, "Partner Relations", PartnerRole::Manager),
        Partner::new(SERVICE_MANAGER, "Services Desk", PartnerRole::Manager),
        Partner::new(PARTNER, "El Mottaheda Group", PartnerRole::Partner),
    ]))
}

/// High-value listings first, then all listings, then an inert lead rule.
pub fn make_rules() -> Vec<RoutingRule> {
    vec![
        RoutingRule::new(
            "high-value-listings",
            LocalizedText::new("High value listings", "عقارات مرتفعة القيمة"),
            vec![
                Condition::new("type", Operator::Equals, "PROPERTY_LISTING_REQUEST"),
                Condition::new(
                    "payload.propertyDetails.price",
                    Operator::GreaterThan,
                    5_000_000,
                ),
            ],
            LISTINGS_MANAGER,
        ),
        RoutingRule::new(
            "all-listings",
            LocalizedText::new("Listings", "طلبات الإدراج"),
            vec![Condition::new(
                "type",
                Operator::Equals,
                "PROPERTY_LISTING_REQUEST",
            )],
            CUSTOMER_RELATIONS,
        ),
        RoutingRule::new(
            "finishing-leads",
            LocalizedText::new("Finishing leads", "طلبات التشطيب"),
            vec![
                Condition::new("type", Operator::Equals, "LEAD"),
                Condition::new("payload.serviceType", Operator::Equals, "finishing"),
            ],
            SERVICE_MANAGER,
        ),
    ]
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub store: Arc<RequestStore>,
    pub rules: Arc<RuleStore>,
    pub sink: Arc<InMemorySink>,
}

/// Dispatcher wired to in-memory collaborators.
pub fn make_harness(rules: Vec<RoutingRule>) -> Harness {
    let sink = Arc::new(InMemorySink::new());
    let rules = Arc::new(RuleStore::with_rules(rules).unwrap());
    let store = Arc::new(RequestStore::new(make_directory(), sink.clone()));
    let dispatcher = Dispatcher::new(
        rules.clone(),
        FallbackAssignees::default(),
        Arc::clone(&store),
    );
    Harness {
        dispatcher,
        store,
        rules,
        sink,
    }
}

pub fn requester(name: &str) -> RequesterInfo {
    RequesterInfo::new(name, "01000000000")
}

/// Router over the default configuration with the test rules and directory.
pub fn make_app() -> (axum::Router, Arc<AppState>) {
    let config = Arc::new(TriageConfig::default());
    let rules = Arc::new(RuleStore::with_rules(make_rules()).unwrap());
    let state = Arc::new(AppState::with_components(
        config,
        rules,
        make_directory(),
        Arc::new(InMemorySink::new()),
    ));
    (create_router(Arc::clone(&state)), state)
}

// =============================================================================
// HTTP Helpers
// =============================================================================

pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}
