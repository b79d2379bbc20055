//! Member Lifecycle - Participation lifecycle core for association memberships
//!
//! This crate tracks memberships, subscriptions and event registrations
//! through their status lifecycle: tier pricing, eligibility, proration of
//! mid-term changes, renewal, reviewed change requests and the daily sweep
//! that lapses, expires and reactivates participations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
