//! # REST API
//!
//! HTTP surface over the dispatcher, the request/lead store, the rule
//! store and the in-app notification inbox.
//!
//! ## Endpoints
//!
//! - `GET /health` - Status with store and rule counts
//! - `GET /metrics`, `GET /v1/stats` - Prometheus and JSON metrics
//! - `GET|POST /v1/requests`, `GET|PATCH /v1/requests/{id}`
//! - `GET /v1/leads`, `GET|PATCH /v1/leads/{id}`, `POST /v1/leads/{id}/messages`
//! - `GET|POST /v1/rules`, `GET|PUT|DELETE /v1/rules/{id}`,
//!   `POST /v1/rules/{id}/move`, `POST /v1/rules/evaluate`
//! - `GET /v1/notifications?user_id=`, `POST /v1/notifications/{id}/read`
//!
//! ## Example
//!
//! ```no_run
//! use triage::api::{AppState, create_router};
//! use triage::config::TriageConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(TriageConfig::default());
//! let state = Arc::new(AppState::new(config)?);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Errors share one envelope:
//! ```json
//! {
//!   "error": {
//!     "message": "Request 'req-42' not found",
//!     "type": "invalid_request_error",
//!     "code": "not_found"
//!   }
//! }
//! ```

mod health;
mod leads;
mod notifications;
mod requests;
mod rules;
pub mod types;

pub use types::*;

use crate::config::TriageConfig;
use crate::directory::PartnerDirectory;
use crate::metrics::MetricsCollector;
use crate::notify::InMemorySink;
use crate::routing::{Dispatcher, RuleError, RuleStore};
use crate::store::RequestStore;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: Arc<TriageConfig>,
    pub rules: Arc<RuleStore>,
    pub store: Arc<RequestStore>,
    pub dispatcher: Arc<Dispatcher>,
    pub notifications: Arc<InMemorySink>,
    /// Server startup time for uptime tracking
    pub start_time: Instant,
    pub metrics_collector: Arc<MetricsCollector>,
}

impl AppState {
    /// Build state from configuration: seeded directory, seeded rules and
    /// an in-memory inbox.
    pub fn new(config: Arc<TriageConfig>) -> Result<Self, RuleError> {
        let rules = Arc::new(config.rule_store()?);
        let directory = Arc::new(config.directory());
        Ok(Self::with_components(
            config,
            rules,
            directory,
            Arc::new(InMemorySink::new()),
        ))
    }

    /// Build state around caller-provided collaborators.
    pub fn with_components(
        config: Arc<TriageConfig>,
        rules: Arc<RuleStore>,
        directory: Arc<dyn PartnerDirectory>,
        notifications: Arc<InMemorySink>,
    ) -> Self {
        let start_time = Instant::now();
        let store = Arc::new(RequestStore::new(directory, notifications.clone()));
        let dispatcher = Arc::new(Dispatcher::new(
            rules.clone(),
            config.routing.fallbacks(),
            Arc::clone(&store),
        ));

        // Reuse a detached handle when a global recorder is already installed (tests)
        let prometheus_handle = crate::metrics::setup_metrics().unwrap_or_else(|e| {
            tracing::debug!("Metrics already initialized, creating new handle: {}", e);
            crate::metrics::PrometheusBuilder::new()
                .build_recorder()
                .handle()
        });
        let metrics_collector = Arc::new(MetricsCollector::new(
            Arc::clone(&store),
            Arc::clone(&rules),
            start_time,
            prometheus_handle,
        ));

        Self {
            config,
            rules,
            store,
            dispatcher,
            notifications,
            start_time,
            metrics_collector,
        }
    }
}

/// Create the main API router with all endpoints configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.server.max_body_bytes;
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .route("/health", get(health::handle))
        .route("/metrics", get(crate::metrics::handler::metrics_handler))
        .route("/v1/stats", get(crate::metrics::handler::stats_handler))
        .route("/v1/requests", get(requests::list).post(requests::create))
        .route(
            "/v1/requests/:id",
            get(requests::get).patch(requests::update),
        )
        .route("/v1/leads", get(leads::list))
        .route("/v1/leads/:id", get(leads::get).patch(leads::update))
        .route("/v1/leads/:id/messages", post(leads::add_message))
        .route("/v1/rules", get(rules::list).post(rules::create))
        .route("/v1/rules/evaluate", post(rules::evaluate))
        .route(
            "/v1/rules/:id",
            get(rules::get).put(rules::replace).delete(rules::delete),
        )
        .route("/v1/rules/:id/move", post(rules::move_rule))
        .route("/v1/notifications", get(notifications::list))
        .route("/v1/notifications/:id/read", post(notifications::mark_read))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(crate::logging::make_request_span::<axum::body::Body>),
        )
        .with_state(state)
}
