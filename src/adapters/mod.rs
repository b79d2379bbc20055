//! Adapters - Implementations of port interfaces.
//!
//! - `memory` - In-memory repositories, catalog and member directory
//! - `events` - In-process event bus
//! - `benefits` - Benefit hooks that log
//! - `snapshot` - YAML snapshot loading the in-memory adapters

pub mod benefits;
pub mod events;
pub mod memory;
pub mod snapshot;

pub use benefits::TracingBenefitHooks;
pub use events::InMemoryEventBus;
pub use memory::{
    InMemoryCatalog, InMemoryChangeRequestRepository, InMemoryMemberDirectory,
    InMemoryParticipationRepository,
};
pub use snapshot::{InMemoryBackend, Snapshot, SnapshotError, SnapshotStore};
