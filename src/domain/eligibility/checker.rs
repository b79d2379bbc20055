//! Product eligibility rules.
//!
//! Every rule is evaluated independently so a member sees all the reasons
//! they fail at once. The result is advisory: callers decide whether to
//! block or flag for manual review.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::catalog::{SubscriptionProduct, SubscriptionScope};
use crate::domain::member::MemberProfile;
use crate::domain::pricing::ResolvedPrice;

/// Why a member is not eligible for a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Product is member-only and the holder has no active base membership.
    MemberOnly,
    /// Product restricts member types and the holder has none on record.
    MemberTypeMissing,
    /// Holder's member type is outside the product's eligible set.
    MemberTypeNotAllowed,
    /// Enterprise product requested by an individual.
    OrganizationsOnly,
    /// Individual product requested by an organization.
    IndividualsOnly,
    BelowMinimumAge,
    AboveMaximumAge,
    /// The applicable tier needs verified documents.
    VerificationRequired,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::MemberOnly => "member_only",
            ReasonCode::MemberTypeMissing => "member_type_missing",
            ReasonCode::MemberTypeNotAllowed => "member_type_not_allowed",
            ReasonCode::OrganizationsOnly => "organizations_only",
            ReasonCode::IndividualsOnly => "individuals_only",
            ReasonCode::BelowMinimumAge => "below_minimum_age",
            ReasonCode::AboveMaximumAge => "above_maximum_age",
            ReasonCode::VerificationRequired => "verification_required",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
    pub reasons: Vec<ReasonCode>,
}

impl Eligibility {
    fn from_reasons(reasons: Vec<ReasonCode>) -> Self {
        Self {
            eligible: reasons.is_empty(),
            reasons,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EligibilityChecker;

impl EligibilityChecker {
    pub fn new() -> Self {
        Self
    }

    /// Checks whether `member` may hold `product` on `today`.
    ///
    /// `price` is the price resolved for the member, used for the tier's
    /// verification requirement. Age bounds only apply to individuals with
    /// a known birth date.
    pub fn check(
        &self,
        product: &SubscriptionProduct,
        member: &MemberProfile,
        price: Option<&ResolvedPrice>,
        today: NaiveDate,
    ) -> Eligibility {
        let mut reasons = Vec::new();

        if product.member_only && !member.has_active_membership {
            reasons.push(ReasonCode::MemberOnly);
        }

        if !product.eligible_member_types.is_empty() {
            match &member.member_type {
                None => reasons.push(ReasonCode::MemberTypeMissing),
                Some(mt) if !product.eligible_member_types.contains(mt) => {
                    reasons.push(ReasonCode::MemberTypeNotAllowed)
                }
                Some(_) => {}
            }
        }

        match (product.scope, member.holder.is_organization()) {
            (SubscriptionScope::Enterprise, false) => reasons.push(ReasonCode::OrganizationsOnly),
            (SubscriptionScope::Individual, true) => reasons.push(ReasonCode::IndividualsOnly),
            _ => {}
        }

        if !member.holder.is_organization() {
            if let Some(age) = member.age_on(today) {
                if product.min_age.map_or(false, |min| age < min) {
                    reasons.push(ReasonCode::BelowMinimumAge);
                }
                if product.max_age.map_or(false, |max| age > max) {
                    reasons.push(ReasonCode::AboveMaximumAge);
                }
            }
        }

        if price.map_or(false, |p| p.requires_verification) && !member.verified {
            reasons.push(ReasonCode::VerificationRequired);
        }

        Eligibility::from_reasons(reasons)
    }
}
