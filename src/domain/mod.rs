//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, events, state machine)
//! - `catalog` - Subscription products and member-type pricing tiers
//! - `member` - Holders and the member facts the core reads
//! - `participation` - The participation aggregate, its statuses and history
//! - `pricing` - Tier price resolution
//! - `billing` - Proration of mid-term changes
//! - `eligibility` - Product eligibility rules
//! - `lifecycle` - State machine engine, policy and daily sweep rules
//! - `renewal` - Next-term planning
//! - `change_request` - Reviewed plan, category, pause, termination and extension requests

pub mod billing;
pub mod catalog;
pub mod change_request;
pub mod eligibility;
pub mod foundation;
pub mod lifecycle;
pub mod member;
pub mod participation;
pub mod pricing;
pub mod renewal;
