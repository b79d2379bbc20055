//! Daily sweep decisions.
//!
//! Each pass is a filter over one status; a participation matches at most
//! one pass. After a transition the predicate no longer matches, which is
//! what makes re-running the sweep on the same date a no-op.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::TransitionRequest;
use crate::domain::participation::{CancellationReason, Participation, ParticipationStatus};

/// Which rule selected a participation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPass {
    /// An active successor exists and this term has ended.
    Superseded,
    /// Active with paid-through before the sweep date.
    Lapse,
    /// Grace deadline has passed.
    GraceExpiry,
    /// Suspension end reached.
    SuspensionEnd,
}

impl SweepPass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepPass::Superseded => "superseded",
            SweepPass::Lapse => "lapse",
            SweepPass::GraceExpiry => "grace_expiry",
            SweepPass::SuspensionEnd => "suspension_end",
        }
    }
}

/// A transition the sweep wants to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepDecision {
    pub pass: SweepPass,
    pub request: TransitionRequest,
}

/// Evaluates one participation against `as_of`.
///
/// `successor` is the renewal linking back to it, if any. Only an active
/// successor supersedes the old term; an unpaid or ended one leaves it to
/// the lapse and grace passes.
pub fn evaluate(
    p: &Participation,
    successor: Option<&Participation>,
    as_of: NaiveDate,
) -> Option<SweepDecision> {
    if !p.status.is_open() {
        return None;
    }

    let superseded = successor.is_some_and(|s| s.status == ParticipationStatus::Active);
    if superseded && p.term_end < as_of {
        return Some(SweepDecision {
            pass: SweepPass::Superseded,
            request: TransitionRequest::automated(
                ParticipationStatus::Terminated,
                format!("Automatic: superseded by renewal after term ended {}", p.term_end),
            )
            .with_cancellation_reason(CancellationReason::superseded()),
        });
    }

    match p.status {
        ParticipationStatus::Active if p.paid_through < as_of => Some(SweepDecision {
            pass: SweepPass::Lapse,
            request: TransitionRequest::automated(
                ParticipationStatus::Grace,
                format!("Automatic: paid through {}", p.paid_through),
            ),
        }),
        ParticipationStatus::Grace => match p.grace_end {
            Some(end) if end < as_of => Some(SweepDecision {
                pass: SweepPass::GraceExpiry,
                request: TransitionRequest::automated(
                    ParticipationStatus::Terminated,
                    format!("Automatic: grace period ended {}", end),
                )
                .with_cancellation_reason(CancellationReason::grace_expired()),
            }),
            _ => None,
        },
        ParticipationStatus::Suspended => match p.suspend_end {
            Some(end) if end <= as_of => {
                let (target, reason) = if p.paid_through >= as_of {
                    (ParticipationStatus::Active, format!("Automatic: suspension ended {}", end))
                } else {
                    (
                        ParticipationStatus::Grace,
                        format!("Automatic: suspension ended {}, payment outstanding", end),
                    )
                };
                Some(SweepDecision {
                    pass: SweepPass::SuspensionEnd,
                    request: TransitionRequest::automated(target, reason),
                })
            }
            _ => None,
        },
        _ => None,
    }
}
