//! Append-only participation history.

use serde::{Deserialize, Serialize};

use super::ParticipationStatus;
use crate::domain::foundation::{HistoryRecordId, ParticipationId, Timestamp};

/// One status transition of a participation.
///
/// Created once per transition and never mutated. Published as the
/// `participation.status_changed.v1` event that notification and reporting
/// collaborators consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryRecordId,
    pub participation_id: ParticipationId,
    pub old_status: ParticipationStatus,
    pub new_status: ParticipationStatus,
    pub reason: String,
    pub automated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
    pub recorded_at: Timestamp,
}

crate::domain_event!(
    HistoryRecord,
    event_type = "participation.status_changed.v1",
    aggregate_id = participation_id,
    aggregate_type = "Participation",
    occurred_at = recorded_at,
    event_id = id
);

impl HistoryRecord {
    /// Records a transition. Blank reasons become "No reason specified".
    pub fn new(
        participation_id: ParticipationId,
        old_status: ParticipationStatus,
        new_status: ParticipationStatus,
        reason: impl Into<String>,
        automated: bool,
        external_ref: Option<String>,
        recorded_at: Timestamp,
    ) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            "No reason specified".to_string()
        } else {
            reason
        };
        Self {
            id: HistoryRecordId::new(),
            participation_id,
            old_status,
            new_status,
            reason,
            automated,
            external_ref,
            recorded_at,
        }
    }
}
