//! # Metrics Collection Module
//!
//! Prometheus export and a JSON stats view of the engine.
//!
//! ## Overview
//!
//! This module exposes two endpoints:
//! - `GET /metrics` - Prometheus text format metrics
//! - `GET /v1/stats` - JSON format statistics
//!
//! ## Metrics Tracked
//!
//! **Counters:**
//! - `triage_requests_total{type, outcome}` - Created requests by routing outcome
//! - `triage_notification_failures_total` - Notifications the sink rejected
//!
//! **Gauges:**
//! - `triage_requests_stored` - Non-lead requests held
//! - `triage_leads_stored` - Leads held
//! - `triage_rules_active` - Active routing rules

pub mod handler;
pub mod types;

pub use types::*;

// Re-export PrometheusBuilder for test compatibility
pub use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RuleStore;
use crate::store::{LeadStatus, RequestStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Central coordinator for metrics collection and gauge computation.
pub struct MetricsCollector {
    store: Arc<RequestStore>,
    rules: Arc<RuleStore>,
    /// Server startup time for uptime calculation
    start_time: Instant,
    prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl MetricsCollector {
    pub fn new(
        store: Arc<RequestStore>,
        rules: Arc<RuleStore>,
        start_time: Instant,
        prometheus_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        Self {
            store,
            rules,
            start_time,
            prometheus_handle,
        }
    }

    /// Refresh store and rule gauges.
    pub fn update_store_gauges(&self) {
        metrics::gauge!("triage_requests_stored").set(self.store.request_count() as f64);
        metrics::gauge!("triage_leads_stored").set(self.store.lead_count() as f64);
        metrics::gauge!("triage_rules_active").set(self.rules.list_active().len() as f64);
    }

    /// Get uptime in seconds since startup.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Snapshot for `GET /v1/stats`.
    pub fn stats(&self) -> StatsResponse {
        let mut leads_by_status: BTreeMap<LeadStatus, usize> =
            LeadStatus::ALL.iter().map(|s| (*s, 0)).collect();
        for lead in self.store.all_leads() {
            *leads_by_status.entry(lead.status).or_default() += 1;
        }

        StatsResponse {
            uptime_seconds: self.uptime_seconds(),
            requests: self.store.request_count(),
            leads: LeadStats {
                total: self.store.lead_count(),
                by_status: leads_by_status,
            },
            rules: RuleStats {
                total: self.rules.len(),
                active: self.rules.list_active().len(),
            },
        }
    }

    /// Render Prometheus metrics in text format.
    pub fn render_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

/// Install the global Prometheus recorder.
///
/// Fails when a recorder is already installed; callers fall back to a
/// detached handle.
pub fn setup_metrics(
) -> Result<metrics_exporter_prometheus::PrometheusHandle, Box<dyn std::error::Error>> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}
