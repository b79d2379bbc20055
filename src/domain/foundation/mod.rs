//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, errors and the event envelope
//! that form the vocabulary of the member lifecycle domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{
    ChangeRequestId, ChapterId, CommitteeId, HistoryRecordId, MemberId, MemberType,
    OrganizationId, ParticipationId, ProductId, TierId,
};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
