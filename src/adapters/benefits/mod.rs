//! Benefit hook adapters.

mod tracing_hooks;

pub use tracing_hooks::TracingBenefitHooks;
