//! Eligibility - may this member hold this product?

mod checker;

pub use checker::{Eligibility, EligibilityChecker, ReasonCode};
