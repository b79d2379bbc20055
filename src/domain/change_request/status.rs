//! Change request approval states.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeRequestStatus {
    /// Being prepared; also where an ineligible submission stays.
    Draft,
    /// Eligible and awaiting review.
    Submitted,
    /// Approved, to be processed on or after its effective date. Rejected
    /// from here when it turns out it can never be applied.
    Approved,
    /// Applied to the participation. Terminal.
    Processed,
    Rejected,
    Cancelled,
}

impl ChangeRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeRequestStatus::Draft => "draft",
            ChangeRequestStatus::Submitted => "submitted",
            ChangeRequestStatus::Approved => "approved",
            ChangeRequestStatus::Processed => "processed",
            ChangeRequestStatus::Rejected => "rejected",
            ChangeRequestStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ChangeRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ChangeRequestStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ChangeRequestStatus::*;
        matches!(
            (self, target),
            (Draft, Submitted)
                | (Draft, Cancelled)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Submitted, Cancelled)
                | (Approved, Processed)
                | (Approved, Rejected)
                | (Approved, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ChangeRequestStatus::*;
        match self {
            Draft => vec![Submitted, Cancelled],
            Submitted => vec![Approved, Rejected, Cancelled],
            Approved => vec![Processed, Rejected, Cancelled],
            Processed | Rejected | Cancelled => vec![],
        }
    }
}
