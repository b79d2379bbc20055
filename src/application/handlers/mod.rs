//! Application handlers.
//!
//! Command and query handlers that orchestrate lifecycle, pricing, change
//! request, renewal and sweep operations over the ports.

pub mod change_request;
pub mod lifecycle;
pub mod pricing;
pub mod renewal;
pub mod sweep;

#[cfg(test)]
pub(crate) mod test_support;

pub use change_request::{
    ProcessChangeRequestCommand, ProcessChangeRequestHandler, ProcessChangeRequestResult,
    ProcessScheduledChangesCommand, ProcessScheduledChangesHandler, ResubmitChangeRequestCommand,
    ReviewChangeRequestCommand, ReviewChangeRequestHandler, ReviewDecision,
    ScheduledChangesReport, SubmitChangeRequestCommand, SubmitChangeRequestHandler,
    SubmitChangeRequestResult,
};
pub use lifecycle::{
    LinkParentCommand, LinkParentHandler, RequestTransitionCommand, RequestTransitionHandler,
    RequestTransitionResult, TransitionExecutor,
};
pub use pricing::{ResolvePriceHandler, ResolvePriceQuery, ResolvePriceResult};
pub use renewal::{
    RenewParticipationCommand, RenewParticipationHandler, RenewParticipationResult, RenewalPayment,
};
pub use sweep::{RunDailySweepCommand, RunDailySweepHandler, SweepOptions, SweepReport};
