//! Rule administration endpoints.

use super::{ApiError, AppState, CreateRequestBody, MoveRuleBody};
use crate::routing::{RoutingDecision, RoutingRule};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// GET /v1/rules - All rules in priority order, inactive included.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<RoutingRule>> {
    Json(state.rules.list())
}

/// POST /v1/rules - Append a rule at lowest priority.
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RoutingRule>, JsonRejection>,
) -> Result<(StatusCode, Json<RoutingRule>), ApiError> {
    let Json(rule) = body?;
    validate_rule(&rule)?;
    state.rules.add(rule.clone())?;
    tracing::info!(rule_id = %rule.id, assign_to = %rule.action.assign_to, "Rule added");
    Ok((StatusCode::CREATED, Json(rule)))
}

/// GET /v1/rules/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoutingRule>, ApiError> {
    state
        .rules
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Rule", &id))
}

/// PUT /v1/rules/{id} - Replace in place, keeping position.
pub async fn replace(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<RoutingRule>, JsonRejection>,
) -> Result<Json<RoutingRule>, ApiError> {
    let Json(rule) = body?;
    validate_rule(&rule)?;
    let updated = state.rules.update(&id, rule)?;
    tracing::info!(rule_id = %id, "Rule updated");
    Ok(Json(updated))
}

/// DELETE /v1/rules/{id}
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RoutingRule>, ApiError> {
    let removed = state.rules.remove(&id)?;
    tracing::info!(rule_id = %id, "Rule removed");
    Ok(Json(removed))
}

/// POST /v1/rules/{id}/move - Reorder.
pub async fn move_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<MoveRuleBody>, JsonRejection>,
) -> Result<Json<Vec<RoutingRule>>, ApiError> {
    let Json(body) = body?;
    state.rules.move_to(&id, body.index)?;
    tracing::info!(rule_id = %id, index = body.index, "Rule moved");
    Ok(Json(state.rules.list()))
}

/// POST /v1/rules/evaluate - Where a request would be routed, without creating it.
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<Json<RoutingDecision>, ApiError> {
    let Json(body) = body?;
    let decision =
        state
            .dispatcher
            .preview(body.request_type, body.requester_info, body.payload)?;
    Ok(Json(decision))
}

fn validate_rule(rule: &RoutingRule) -> Result<(), ApiError> {
    if rule.id.trim().is_empty() {
        return Err(ApiError::invalid_field("id", "rule id cannot be empty"));
    }
    if rule.action.assign_to.trim().is_empty() {
        return Err(ApiError::invalid_field(
            "action.assignTo",
            "assignee cannot be empty",
        ));
    }
    Ok(())
}
