//! Participation kinds.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::TermLength;
use crate::domain::foundation::{ChapterId, CommitteeId};

/// What a participation entitles its holder to.
///
/// Closed set; kind-specific data lives on its variant so a committee
/// position can never be attached to a plain membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipationKind {
    Membership,
    ChapterMembership { chapter: ChapterId },
    CommitteePosition { committee: CommitteeId, position: String },
    GenericSubscription,
}

impl ParticipationKind {
    /// Default term for new participations of this kind.
    ///
    /// `None` means the product's own term applies.
    pub fn default_term(&self) -> Option<TermLength> {
        match self {
            ParticipationKind::Membership | ParticipationKind::ChapterMembership { .. } => {
                Some(TermLength::years(1))
            }
            ParticipationKind::CommitteePosition { .. } => Some(TermLength::years(2)),
            ParticipationKind::GenericSubscription => None,
        }
    }

    /// Whether this kind counts toward the single-active-membership rule.
    pub fn is_base_membership(&self) -> bool {
        matches!(self, ParticipationKind::Membership)
    }

    /// Ongoing kinds renew automatically when auto-renew is on; committee
    /// terms and one-off subscriptions do not.
    pub fn supports_auto_renew(&self) -> bool {
        matches!(
            self,
            ParticipationKind::Membership | ParticipationKind::ChapterMembership { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParticipationKind::Membership => "membership",
            ParticipationKind::ChapterMembership { .. } => "chapter_membership",
            ParticipationKind::CommitteePosition { .. } => "committee_position",
            ParticipationKind::GenericSubscription => "generic_subscription",
        }
    }
}
