//! Notification sink collaborator.
//!
//! Notifications are fire-and-forget: a failing sink is logged and counted,
//! never propagated into the operation that triggered it.

use crate::locale::LocalizedText;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the engine asks the sink to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub user_id: String,
    pub message: LocalizedText,
    /// In-app deep link
    pub link: String,
}

/// A delivered notification as kept by [`InMemorySink`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub message: LocalizedText,
    pub link: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError>;
}

/// Deliver without failing the caller.
pub async fn notify_best_effort(sink: &dyn NotificationSink, request: NotificationRequest) {
    let user_id = request.user_id.clone();
    match sink.notify(request).await {
        Ok(()) => {
            tracing::debug!(user_id = %user_id, "Notification delivered");
        }
        Err(e) => {
            metrics::counter!("triage_notification_failures_total").increment(1);
            tracing::warn!(user_id = %user_id, error = %e, "Notification dropped");
        }
    }
}

/// Sink that stores notifications in memory for the in-app inbox.
#[derive(Debug, Default)]
pub struct InMemorySink {
    notifications: DashMap<String, Notification>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications for a user, newest first.
    pub fn list_for_user(&self, user_id: &str) -> Vec<Notification> {
        let mut list: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    pub fn unread_count(&self, user_id: &str) -> usize {
        self.notifications
            .iter()
            .filter(|entry| entry.value().user_id == user_id && !entry.value().is_read)
            .count()
    }

    /// Mark one notification read. Returns `None` for unknown ids.
    pub fn mark_read(&self, id: &str) -> Option<Notification> {
        let mut entry = self.notifications.get_mut(id)?;
        entry.is_read = true;
        Some(entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        let notification = Notification {
            id: format!("notif-{}", uuid::Uuid::new_v4()),
            user_id: request.user_id,
            message: request.message,
            link: request.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications
            .insert(notification.id.clone(), notification);
        Ok(())
    }
}

/// Sink that only logs. Used by CLI dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, request: NotificationRequest) -> Result<(), NotifyError> {
        tracing::info!(
            user_id = %request.user_id,
            link = %request.link,
            message = %request.message.en,
            "Notification"
        );
        Ok(())
    }
}
