//! Enrollment Gate - course enrollment fulfillment and access control.
//!
//! Students buy courses through a hosted payment provider checkout. A
//! verified payment webhook (or a zero price) is the only path to an
//! enrollment, and the access gate checks enrollment on every protected
//! request.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
