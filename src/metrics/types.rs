//! # Metrics Types
//!
//! Data structures for the JSON stats response.

use crate::store::LeadStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// JSON response for GET /v1/stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub uptime_seconds: u64,
    /// Non-lead requests held
    pub requests: usize,
    pub leads: LeadStats,
    pub rules: RuleStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadStats {
    pub total: usize,
    /// Every lead status appears, zero counts included
    pub by_status: BTreeMap<LeadStatus, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleStats {
    pub total: usize,
    pub active: usize,
}
