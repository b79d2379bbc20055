//! Lifecycle error type.

use thiserror::Error;

use crate::domain::eligibility::ReasonCode;
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::domain::participation::ParticipationStatus;

/// Errors surfaced by lifecycle operations.
///
/// A failed operation never leaves a partially applied participation
/// behind: either the whole transition commits or nothing does.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Cannot transition participation from {from} to {to}")]
    InvalidTransition {
        from: ParticipationStatus,
        to: ParticipationStatus,
    },

    #[error("Transition from {from} to {to} requires approval")]
    ApprovalRequired {
        from: ParticipationStatus,
        to: ParticipationStatus,
    },

    #[error("Member is not eligible: {}", join_reasons(.reasons))]
    EligibilityFailure { reasons: Vec<ReasonCode> },

    #[error("Proration skipped: term has no length")]
    ProrationUnderflow,

    #[error("Version conflict on {id}: expected {expected}, found {actual}")]
    ConcurrencyConflict { id: String, expected: u64, actual: u64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Change request is {status}, cannot {action}")]
    InvalidChangeRequestState { status: String, action: String },

    #[error("Participation is not renewable: {reason}")]
    NotRenewable { reason: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

fn join_reasons(reasons: &[ReasonCode]) -> String {
    reasons
        .iter()
        .map(ReasonCode::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LifecycleError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        LifecycleError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LifecycleError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Error code shared with the rest of the domain.
    pub fn code(&self) -> ErrorCode {
        match self {
            LifecycleError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            LifecycleError::ApprovalRequired { .. } => ErrorCode::ApprovalRequired,
            LifecycleError::EligibilityFailure { .. } => ErrorCode::EligibilityFailure,
            LifecycleError::ProrationUnderflow => ErrorCode::ProrationUnderflow,
            LifecycleError::ConcurrencyConflict { .. } => ErrorCode::ConcurrencyConflict,
            LifecycleError::NotFound { entity, .. } => match *entity {
                "Participation" => ErrorCode::ParticipationNotFound,
                "Product" => ErrorCode::ProductNotFound,
                "Member" => ErrorCode::MemberNotFound,
                "ChangeRequest" => ErrorCode::ChangeRequestNotFound,
                _ => ErrorCode::InternalError,
            },
            LifecycleError::InvalidChangeRequestState { .. } => ErrorCode::InvalidChangeRequestState,
            LifecycleError::NotRenewable { .. } => ErrorCode::NotRenewable,
            LifecycleError::Validation { .. } => ErrorCode::ValidationFailed,
            LifecycleError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// True for optimistic-lock failures the sweep retries on its next run.
    pub fn is_conflict(&self) -> bool {
        matches!(self, LifecycleError::ConcurrencyConflict { .. })
    }

    /// True when the same call may succeed later without anyone changing
    /// the inputs: lost races and storage failures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LifecycleError::ConcurrencyConflict { .. } | LifecycleError::Infrastructure(_)
        )
    }
}

impl From<DomainError> for LifecycleError {
    fn from(err: DomainError) -> Self {
        let detail = |key: &str| err.details.get(key).cloned().unwrap_or_default();
        match err.code {
            ErrorCode::ConcurrencyConflict => LifecycleError::ConcurrencyConflict {
                id: detail("id"),
                expected: err.detail_u64("expected").unwrap_or_default(),
                actual: err.detail_u64("actual").unwrap_or_default(),
            },
            ErrorCode::ParticipationNotFound => LifecycleError::NotFound {
                entity: "Participation",
                id: detail("id"),
            },
            ErrorCode::ProductNotFound => LifecycleError::NotFound {
                entity: "Product",
                id: detail("id"),
            },
            ErrorCode::MemberNotFound => LifecycleError::NotFound {
                entity: "Member",
                id: detail("id"),
            },
            ErrorCode::ChangeRequestNotFound => LifecycleError::NotFound {
                entity: "ChangeRequest",
                id: detail("id"),
            },
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => LifecycleError::Validation {
                field: detail("field"),
                message: err.message,
            },
            _ => LifecycleError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for LifecycleError {
    fn from(err: ValidationError) -> Self {
        let field = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field.clone(),
        };
        LifecycleError::Validation {
            field,
            message: err.to_string(),
        }
    }
}
