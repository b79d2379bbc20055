//! Participation - one holder's entitlement term and its audit trail.

mod aggregate;
mod cancellation;
mod hierarchy;
mod history;
mod kind;
mod status;

pub use aggregate::{Participation, BILL_THROUGH_SLACK_DAYS};
pub use cancellation::{CancellationCategory, CancellationReason};
pub use hierarchy::{ensure_acyclic_link, MAX_HIERARCHY_DEPTH};
pub use history::HistoryRecord;
pub use kind::ParticipationKind;
pub use status::{MemberStatus, ParticipationStatus};
