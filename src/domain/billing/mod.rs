//! Billing computations. The core decides what is owed; capturing payment
//! belongs to the invoicing collaborator.

mod payment_plan;
mod proration;

pub use payment_plan::{
    FirstPaymentDue, Installment, InstallmentStatus, IntervalUnit, PaymentFrequency, PaymentPlan,
    PaymentSchedule,
};
pub use proration::{ProrationCalculator, ProrationInput, ProrationResult};
