//! Member facts consumed by eligibility and pricing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Holder;
use crate::domain::foundation::MemberType;

/// What the lifecycle core knows about a member.
///
/// Owned by the member-directory collaborator; the core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub holder: Holder,
    #[serde(default)]
    pub member_type: Option<MemberType>,
    /// Holds a current base membership (used by member-only products).
    #[serde(default)]
    pub has_active_membership: bool,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Eligibility documents (student card, retirement proof) verified.
    #[serde(default)]
    pub verified: bool,
}

impl MemberProfile {
    pub fn new(holder: Holder) -> Self {
        Self {
            holder,
            member_type: None,
            has_active_membership: false,
            birth_date: None,
            verified: false,
        }
    }

    pub fn with_member_type(mut self, member_type: MemberType) -> Self {
        self.member_type = Some(member_type);
        self
    }

    pub fn with_active_membership(mut self) -> Self {
        self.has_active_membership = true;
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_verification(mut self) -> Self {
        self.verified = true;
        self
    }

    /// Age in whole years on `as_of`, if a birth date is known.
    pub fn age_on(&self, as_of: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        if birth > as_of {
            return Some(0);
        }
        let mut years = as_of.year() - birth.year();
        if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}
