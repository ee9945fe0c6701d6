//! Generic request endpoints.

use super::{ApiError, AppState, CreateRequestBody};
use crate::store::{Request, RequestUpdate};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

/// GET /v1/requests - All requests and projected leads, newest first.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Request>> {
    Json(state.store.get_all_requests().await)
}

/// POST /v1/requests - Create and route a request.
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let Json(body) = body?;
    let request = state
        .dispatcher
        .create_request(body.request_type, body.requester_info, body.payload)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/requests/{id}
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Request>, ApiError> {
    state
        .store
        .get_request_by_id(&id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Request", &id))
}

/// PATCH /v1/requests/{id} - Status, assignee or payload update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<RequestUpdate>, JsonRejection>,
) -> Result<Json<Request>, ApiError> {
    let Json(update) = body?;
    state
        .store
        .update_request(&id, update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Request", &id))
}
