//! Request bodies and the error envelope of the REST surface.

use crate::routing::{DispatchError, RuleError};
use crate::store::{RequestType, RequesterInfo, StatusMappingError, StoreError};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/requests` and `POST /v1/rules/evaluate`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub requester_info: RequesterInfo,
    #[serde(default)]
    pub payload: Value,
}

/// Body of `POST /v1/rules/{id}/move`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MoveRuleBody {
    /// Zero-based target position
    pub index: usize,
}

/// Query of `GET /v1/leads`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadQuery {
    pub partner_id: Option<String>,
    pub manager_id: Option<String>,
}

/// Query of `GET /v1/notifications`.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationQuery {
    pub user_id: String,
}

/// Error response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: String, r#type: &str, param: Option<String>, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message,
                r#type: r#type.to_string(),
                param,
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(
            message.to_string(),
            "invalid_request_error",
            None,
            "invalid_request_error",
        )
    }

    /// Bad request naming the offending field (400).
    pub fn invalid_field(field: &str, message: &str) -> Self {
        Self::new(
            message.to_string(),
            "invalid_request_error",
            Some(field.to_string()),
            "invalid_request_error",
        )
    }

    /// Create a not found error (404).
    pub fn not_found(kind: &str, id: &str) -> Self {
        Self::new(
            format!("{} '{}' not found", kind, id),
            "invalid_request_error",
            None,
            "not_found",
        )
    }

    /// Create a conflict error (409).
    pub fn conflict(message: &str) -> Self {
        Self::new(
            message.to_string(),
            "invalid_request_error",
            None,
            "conflict",
        )
    }

    /// Create an internal error (500).
    pub fn internal(message: &str) -> Self {
        Self::new(message.to_string(), "server_error", None, "internal_error")
    }

    /// Get the HTTP status code for this error.
    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("not_found") => StatusCode::NOT_FOUND,
            Some("conflict") => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(&rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(&rejection.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateId(_) => ApiError::conflict(&e.to_string()),
            StoreError::StatusMapping(StatusMappingError::Ambiguous(_)) => {
                ApiError::invalid_field("leadStatus", &e.to_string())
            }
            StoreError::StatusMapping(StatusMappingError::Unmappable(_)) => {
                ApiError::invalid_field("status", &e.to_string())
            }
            StoreError::InvalidAssignee { ref field, .. }
            | StoreError::NotApplicable { ref field, .. } => {
                ApiError::invalid_field(field, &e.to_string())
            }
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Validation { field, message } => {
                ApiError::invalid_field(&field, &message)
            }
            DispatchError::Store(e) => e.into(),
        }
    }
}

impl From<RuleError> for ApiError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::DuplicateRule(_) => ApiError::conflict(&e.to_string()),
            RuleError::RuleNotFound(ref id) => ApiError::not_found("Rule", id),
            RuleError::IndexOutOfRange { .. } => ApiError::invalid_field("index", &e.to_string()),
            RuleError::Unavailable(_) => ApiError::internal(&e.to_string()),
        }
    }
}
