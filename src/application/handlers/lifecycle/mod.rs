//! Lifecycle handlers.
//!
//! - `TransitionExecutor` - Shared commit path for every status change
//! - `RequestTransitionHandler` - Manual and system transition requests
//! - `LinkParentHandler` - Attaches a participation to a parent

mod executor;
mod link_parent;
mod request_transition;

pub use executor::TransitionExecutor;
pub use link_parent::{LinkParentCommand, LinkParentHandler};
pub use request_transition::{
    RequestTransitionCommand, RequestTransitionHandler, RequestTransitionResult,
};
