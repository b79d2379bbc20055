//! Renewal handlers.

mod renew_participation;

pub use renew_participation::{
    RenewParticipationCommand, RenewParticipationHandler, RenewParticipationResult, RenewalPayment,
};
