//! Health check endpoint handler.

use crate::api::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub requests: usize,
    pub leads: usize,
    pub rules: RuleCounts,
}

#[derive(Debug, Serialize)]
pub struct RuleCounts {
    pub total: usize,
    pub active: usize,
}

/// GET /health - Return system health status.
pub async fn handle(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        requests: state.store.request_count(),
        leads: state.store.lead_count(),
        rules: RuleCounts {
            total: state.rules.len(),
            active: state.rules.list_active().len(),
        },
    })
}
