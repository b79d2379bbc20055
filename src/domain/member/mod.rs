//! Member module - who holds participations and what the core knows about them.

mod holder;
mod profile;

pub use holder::Holder;
pub use profile::MemberProfile;
