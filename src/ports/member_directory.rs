//! Member directory port.
//!
//! The member record lives with the membership-administration collaborator.
//! The core reads profiles for pricing and eligibility, and pushes status
//! and category changes back.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberType};
use crate::domain::member::{Holder, MemberProfile};
use crate::domain::participation::MemberStatus;

#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn profile(&self, holder: &Holder) -> Result<Option<MemberProfile>, DomainError>;

    /// Mirrors a base membership's status onto the member record.
    async fn sync_status(&self, holder: &Holder, status: MemberStatus) -> Result<(), DomainError>;

    /// Records a processed category change.
    async fn set_member_type(&self, holder: &Holder, member_type: &MemberType)
        -> Result<(), DomainError>;
}
