//! Lifecycle - the participation state machine, its policy and the daily
//! sweep rules.

mod engine;
mod errors;
mod policy;
pub mod sweep;

pub use engine::{HookCall, LifecycleEngine, TransitionOutcome, TransitionRequest};
pub use errors::LifecycleError;
pub use policy::{LifecyclePolicy, RenewalStrategy};
pub use sweep::{SweepDecision, SweepPass};
