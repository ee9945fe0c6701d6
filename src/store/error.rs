use super::status::StatusMappingError;

/// Errors that can occur during store operations.
///
/// Missing ids are not errors; lookups return `None`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    /// Request and lead ids share one namespace
    #[error("id already in use: {0}")]
    DuplicateId(String),

    #[error(transparent)]
    StatusMapping(#[from] StatusMappingError),

    /// Manual reassignment to a blank id or one the directory does not know
    #[error("{field} must name a known partner or user, got '{id}'")]
    InvalidAssignee { field: String, id: String },

    /// Update field that has no meaning for this kind of record
    #[error("{field} cannot be set on a {record} record")]
    NotApplicable { field: String, record: String },
}

impl StoreError {
    pub(crate) fn invalid_assignee(field: &str, id: &str) -> Self {
        StoreError::InvalidAssignee {
            field: field.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn not_applicable(field: &str, record: &str) -> Self {
        StoreError::NotApplicable {
            field: field.to_string(),
            record: record.to_string(),
        }
    }
}
