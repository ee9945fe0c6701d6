//! In-app notification inbox.

use super::{ApiError, AppState, NotificationQuery};
use crate::notify::Notification;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct InboxResponse {
    pub unread: usize,
    pub data: Vec<Notification>,
}

/// GET /v1/notifications?user_id= - Newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<NotificationQuery>, QueryRejection>,
) -> Result<Json<InboxResponse>, ApiError> {
    let Query(query) = query?;
    Ok(Json(InboxResponse {
        unread: state.notifications.unread_count(&query.user_id),
        data: state.notifications.list_for_user(&query.user_id),
    }))
}

/// POST /v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    state
        .notifications
        .mark_read(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Notification", &id))
}
