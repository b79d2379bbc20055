//! Participation status state machine.
//!
//! Defines all participation states and the valid transitions of the
//! entitlement lifecycle.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Participation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipationStatus {
    /// Signed up, awaiting first payment or approval. No access.
    Prospect,

    /// Paid and in good standing.
    Active,

    /// Payment lapsed; access retained until the grace deadline.
    Grace,

    /// Access revoked pending payment, review or a scheduled resume date.
    Suspended,

    /// Ended by the organization or by lapse. Terminal.
    Terminated,

    /// Ended at the member's request. Terminal.
    Cancelled,
}

impl ParticipationStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [ParticipationStatus; 6] = [
        ParticipationStatus::Prospect,
        ParticipationStatus::Active,
        ParticipationStatus::Grace,
        ParticipationStatus::Suspended,
        ParticipationStatus::Terminated,
        ParticipationStatus::Cancelled,
    ];

    /// Returns true if this status grants access to benefits.
    ///
    /// Access is granted for Active and Grace only.
    pub fn has_access(&self) -> bool {
        matches!(self, ParticipationStatus::Active | ParticipationStatus::Grace)
    }

    /// Returns true for statuses the daily sweep evaluates.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            ParticipationStatus::Active | ParticipationStatus::Grace | ParticipationStatus::Suspended
        )
    }

    /// Member-record status this participation status maps to.
    pub fn member_status(&self) -> MemberStatus {
        match self {
            ParticipationStatus::Prospect => MemberStatus::Prospect,
            ParticipationStatus::Active => MemberStatus::Active,
            ParticipationStatus::Grace => MemberStatus::Grace,
            ParticipationStatus::Suspended => MemberStatus::Suspended,
            ParticipationStatus::Terminated => MemberStatus::Terminated,
            ParticipationStatus::Cancelled => MemberStatus::Lapsed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipationStatus::Prospect => "prospect",
            ParticipationStatus::Active => "active",
            ParticipationStatus::Grace => "grace",
            ParticipationStatus::Suspended => "suspended",
            ParticipationStatus::Terminated => "terminated",
            ParticipationStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for ParticipationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ParticipationStatus::*;
        matches!(
            (self, target),
            // From PROSPECT
            (Prospect, Active)
                | (Prospect, Cancelled)
            // From ACTIVE
                | (Active, Grace)
                | (Active, Suspended)
                | (Active, Terminated)
                | (Active, Cancelled)
            // From GRACE
                | (Grace, Active)
                | (Grace, Suspended)
                | (Grace, Terminated)
                | (Grace, Cancelled)
            // From SUSPENDED
                | (Suspended, Active)
                | (Suspended, Grace)
                | (Suspended, Terminated)
                | (Suspended, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ParticipationStatus::*;
        match self {
            Prospect => vec![Active, Cancelled],
            Active => vec![Grace, Suspended, Terminated, Cancelled],
            Grace => vec![Active, Suspended, Terminated, Cancelled],
            Suspended => vec![Active, Grace, Terminated, Cancelled],
            Terminated | Cancelled => vec![],
        }
    }
}

/// Status mirrored onto the member record by the member-directory
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Prospect,
    Active,
    Grace,
    Suspended,
    Terminated,
    Lapsed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParticipationStatus::*;

    #[test]
    fn prospect_can_activate_or_cancel_only() {
        assert!(Prospect.can_transition_to(&Active));
        assert!(Prospect.can_transition_to(&Cancelled));
        assert!(!Prospect.can_transition_to(&Grace));
        assert!(!Prospect.can_transition_to(&Terminated));
    }

    #[test]
    fn active_cannot_return_to_prospect() {
        assert!(Active.transition_to(Prospect).is_err());
    }

    #[test]
    fn grace_can_recover_to_active() {
        assert_eq!(Grace.transition_to(Active), Ok(Active));
    }

    #[test]
    fn suspended_can_fall_back_to_grace() {
        assert_eq!(Suspended.transition_to(Grace), Ok(Grace));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for target in ParticipationStatus::ALL {
            assert!(!Terminated.can_transition_to(&target));
            assert!(!Cancelled.can_transition_to(&target));
        }
        assert!(Terminated.is_terminal());
        assert!(Cancelled.is_terminal());
        assert!(!Suspended.is_terminal());
    }

    #[test]
    fn self_transitions_are_never_allowed() {
        for status in ParticipationStatus::ALL {
            assert!(!status.can_transition_to(&status));
        }
    }

    #[test]
    fn valid_transitions_agree_with_can_transition_to() {
        for from in ParticipationStatus::ALL {
            for to in ParticipationStatus::ALL {
                assert_eq!(
                    from.valid_transitions().contains(&to),
                    from.can_transition_to(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn access_only_for_active_and_grace() {
        assert!(Active.has_access());
        assert!(Grace.has_access());
        assert!(!Prospect.has_access());
        assert!(!Suspended.has_access());
        assert!(!Terminated.has_access());
    }

    #[test]
    fn open_statuses_are_swept() {
        assert!(Active.is_open());
        assert!(Grace.is_open());
        assert!(Suspended.is_open());
        assert!(!Prospect.is_open());
        assert!(!Cancelled.is_open());
    }

    #[test]
    fn cancelled_maps_to_lapsed_member_status() {
        assert_eq!(Cancelled.member_status(), MemberStatus::Lapsed);
        assert_eq!(Grace.member_status(), MemberStatus::Grace);
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Suspended).unwrap(), r#""suspended""#);
    }
}
