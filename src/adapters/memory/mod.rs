//! In-memory adapters for storage and collaborator ports.

mod catalog;
mod change_request_repository;
mod member_directory;
mod participation_repository;

pub use catalog::InMemoryCatalog;
pub use change_request_repository::InMemoryChangeRequestRepository;
pub use member_directory::InMemoryMemberDirectory;
pub use participation_repository::InMemoryParticipationRepository;
