//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the lifecycle core and its collaborators. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ParticipationRepository` - Participations and their history
//! - `ChangeRequestRepository` - Reviewed change requests
//!
//! ## Collaborator Ports
//!
//! - `CatalogReader` - Products and pricing tiers
//! - `MemberDirectory` - Member profiles and status sync
//! - `BenefitHooks` - Access activation and revocation
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Publishes history records
//! - `EventSubscriber` / `EventHandler` - Consumers of published events

mod benefit_hooks;
mod catalog_reader;
mod change_request_repository;
mod event_publisher;
mod event_subscriber;
mod member_directory;
mod participation_repository;

pub use benefit_hooks::BenefitHooks;
pub use catalog_reader::CatalogReader;
pub use change_request_repository::ChangeRequestRepository;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use member_directory::MemberDirectory;
pub use participation_repository::ParticipationRepository;
