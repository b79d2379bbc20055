//! Change request handlers.
//!
//! ## Commands
//! - Submitting (and resubmitting) requests with eligibility and proration
//! - Reviewing: approve, reject, cancel
//! - Processing one approved request
//! - Processing every request that has come due

mod process_change_request;
mod process_scheduled_changes;
mod review_change_request;
mod submit_change_request;
mod target_price;

pub use process_change_request::{
    ProcessChangeRequestCommand, ProcessChangeRequestHandler, ProcessChangeRequestResult,
};
pub use process_scheduled_changes::{
    ProcessScheduledChangesCommand, ProcessScheduledChangesHandler, ScheduledChangesReport,
};
pub use review_change_request::{ReviewChangeRequestCommand, ReviewChangeRequestHandler, ReviewDecision};
pub use submit_change_request::{
    ResubmitChangeRequestCommand, SubmitChangeRequestCommand, SubmitChangeRequestHandler,
    SubmitChangeRequestResult,
};
