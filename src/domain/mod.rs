//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `enrollment` - Enrollment record, money, checkout intent, access decisions
//! - `payment` - Webhook signature verification and webhook errors

pub mod enrollment;
pub mod foundation;
pub mod payment;
