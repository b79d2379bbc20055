//! The entity that holds a participation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MemberId, OrganizationId};

/// Holder of a participation: exactly one individual or one organization.
///
/// A closed enum makes "both" and "neither" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Holder {
    Individual(MemberId),
    Organization(OrganizationId),
}

impl Holder {
    pub fn is_organization(&self) -> bool {
        matches!(self, Holder::Organization(_))
    }

    pub fn individual(&self) -> Option<MemberId> {
        match self {
            Holder::Individual(id) => Some(*id),
            Holder::Organization(_) => None,
        }
    }

    pub fn organization(&self) -> Option<OrganizationId> {
        match self {
            Holder::Organization(id) => Some(*id),
            Holder::Individual(_) => None,
        }
    }
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Holder::Individual(id) => write!(f, "member:{}", id),
            Holder::Organization(id) => write!(f, "organization:{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_reference_is_exposed() {
        let member = Holder::Individual(MemberId::new());
        assert!(member.individual().is_some());
        assert!(member.organization().is_none());

        let org = Holder::Organization(OrganizationId::new());
        assert!(org.individual().is_none());
        assert!(org.organization().is_some());
        assert!(org.is_organization());
    }

    #[test]
    fn holder_serializes_tagged() {
        let org = Holder::Organization(OrganizationId::new());
        let json = serde_json::to_value(org).unwrap();
        assert_eq!(json["type"], "organization");
        let back: Holder = serde_json::from_value(json).unwrap();
        assert_eq!(back, org);
    }
}
