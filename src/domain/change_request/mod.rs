//! Change requests - reviewed mutations of a participation.

mod aggregate;
mod status;

pub use aggregate::{ChangeKind, ChangeRequest};
pub use status::ChangeRequestStatus;
