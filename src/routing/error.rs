//! Error types for rule administration and dispatch

use crate::store::StoreError;
use thiserror::Error;

/// Errors from the rule store
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule already exists: {0}")]
    DuplicateRule(String),

    #[error("rule not found: {0}")]
    RuleNotFound(String),

    #[error("position {index} out of range for {len} rules")]
    IndexOutOfRange { index: usize, len: usize },

    /// The rule source could not be read (poisoned lock, remote store down)
    #[error("rule store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced to callers of the dispatcher.
///
/// Routing itself never fails; only input validation and persistence do.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid value for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    pub(crate) fn validation(field: &str, message: &str) -> Self {
        DispatchError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
