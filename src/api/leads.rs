//! Lead endpoints for partner dashboards and service managers.

use super::{ApiError, AppState, LeadQuery};
use crate::store::{Lead, LeadUpdate, NewLeadMessage};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use std::sync::Arc;

/// GET /v1/leads?partner_id=&manager_id=
///
/// Filters by partner when given, else by manager, else returns all leads.
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LeadQuery>, QueryRejection>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let Query(query) = query?;
    let leads = match (query.partner_id, query.manager_id) {
        (Some(partner_id), _) => state.store.leads_for_partner(&partner_id),
        (None, Some(manager_id)) => state.store.leads_for_manager(&manager_id),
        (None, None) => state.store.all_leads(),
    };
    Ok(Json(leads))
}

/// GET /v1/leads/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Lead>, ApiError> {
    state
        .store
        .get_lead(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead", &id))
}

/// PATCH /v1/leads/{id} - Status, owner or detail update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<LeadUpdate>, JsonRejection>,
) -> Result<Json<Lead>, ApiError> {
    let Json(update) = body?;
    state
        .store
        .update_lead(&id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead", &id))
}

/// POST /v1/leads/{id}/messages - Append to the thread.
pub async fn add_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<NewLeadMessage>, JsonRejection>,
) -> Result<Json<Lead>, ApiError> {
    let Json(message) = body?;
    if message.content.trim().is_empty() {
        return Err(ApiError::invalid_field("content", "content cannot be empty"));
    }
    state
        .store
        .add_message_to_lead(&id, message)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Lead", &id))
}
