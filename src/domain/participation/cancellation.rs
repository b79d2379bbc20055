//! Cancellation reasons recorded on terminal participations.

use serde::{Deserialize, Serialize};

/// Classification of a cancellation reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationCategory {
    Voluntary,
    Involuntary,
    Administrative,
    System,
    Other,
}

/// Why a participation ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CancellationReason {
    /// Stable uppercase code, e.g. `NON_PAYMENT`.
    pub code: String,
    pub label: String,
    pub category: CancellationCategory,
}

impl CancellationReason {
    pub fn new(
        code: impl Into<String>,
        label: impl Into<String>,
        category: CancellationCategory,
    ) -> Self {
        Self {
            code: code.into().trim().to_uppercase(),
            label: label.into(),
            category,
        }
    }

    /// Reason recorded when the sweep terminates a lapsed grace period.
    pub fn grace_expired() -> Self {
        Self::new("GRACE_EXPIRED", "Grace period expired", CancellationCategory::System)
    }

    /// Reason recorded when a renewal replaces the participation.
    pub fn superseded() -> Self {
        Self::new("SUPERSEDED", "Superseded by renewal", CancellationCategory::System)
    }

    /// Default for other automated endings.
    pub fn system() -> Self {
        Self::new("SYSTEM", "Ended automatically", CancellationCategory::System)
    }

    /// Default for member-initiated cancellations without an explicit reason.
    pub fn member_request() -> Self {
        Self::new("MEMBER_REQUEST", "Cancelled at member's request", CancellationCategory::Voluntary)
    }

    /// Default for staff terminations without an explicit reason.
    pub fn administrative() -> Self {
        Self::new(
            "ADMINISTRATIVE",
            "Terminated by administrator",
            CancellationCategory::Administrative,
        )
    }
}
