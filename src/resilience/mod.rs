//! Resilience helpers.
//!
//! # Design Decisions
//! - Failed certificate sweeps retry sooner than the regular cadence
//! - Jittered backoff keeps retries from hammering the ACME endpoint

pub mod backoff;

pub use backoff::calculate_backoff;
