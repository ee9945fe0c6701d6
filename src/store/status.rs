//! Mapping between lead-native and generic request statuses.
//!
//! The lead status is the source of truth. The forward projection is total;
//! the inverse is partial because `in-progress` collapses four lead states.

use super::lead::LeadStatus;
use super::request::RequestStatus;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusMappingError {
    /// Several lead statuses project onto this one
    #[error("status '{0:?}' is ambiguous for leads; supply a lead status")]
    Ambiguous(RequestStatus),

    /// No lead status projects onto this one
    #[error("status '{0:?}' has no lead equivalent")]
    Unmappable(RequestStatus),
}

/// Project a lead status into the generic vocabulary.
///
/// ```
/// use triage::store::{project_to_request_status, LeadStatus, RequestStatus};
///
/// assert_eq!(project_to_request_status(LeadStatus::Quoted), RequestStatus::InProgress);
/// assert_eq!(project_to_request_status(LeadStatus::Cancelled), RequestStatus::Rejected);
/// ```
pub fn project_to_request_status(status: LeadStatus) -> RequestStatus {
    match status {
        LeadStatus::New => RequestStatus::New,
        LeadStatus::Contacted
        | LeadStatus::SiteVisit
        | LeadStatus::Quoted
        | LeadStatus::InProgress => RequestStatus::InProgress,
        LeadStatus::Completed => RequestStatus::Closed,
        LeadStatus::Cancelled => RequestStatus::Rejected,
    }
}

/// Inverse projection, defined only where it is unambiguous.
pub fn lead_status_for(status: RequestStatus) -> Result<LeadStatus, StatusMappingError> {
    match status {
        RequestStatus::New => Ok(LeadStatus::New),
        RequestStatus::Closed => Ok(LeadStatus::Completed),
        RequestStatus::Rejected => Ok(LeadStatus::Cancelled),
        RequestStatus::InProgress => Err(StatusMappingError::Ambiguous(status)),
        RequestStatus::Pending
        | RequestStatus::Reviewed
        | RequestStatus::Assigned
        | RequestStatus::Approved => Err(StatusMappingError::Unmappable(status)),
    }
}
