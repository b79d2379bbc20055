//! Renewal - next-term planning for participations.

mod orchestrator;

pub use orchestrator::{RenewalOrchestrator, RenewalPlan};
