//! Reconciliation scheduler.
//!
//! # Data Flow
//! ```text
//! controller.rs
//!     Starting: start proxy daemon (fatal on failure)
//!     Running:
//!         every poll interval → reconciler.rs
//!             discover → diff → ensure certs → render → write → reload → commit
//!             route change → nudge renewal
//!         independently → renewal.rs
//!             initial delay, then daily; backoff after failures
//!             acquire trusted certs → reload if material changed
//!     Stopping: wait for loops to finish their unit of work, stop daemon
//!     Stopped
//! ```
//!
//! # Design Decisions
//! - Shutdown is observed between cycles, never mid-subprocess
//! - The route store lock covers only the commit
//! - Write/reload from both timelines serialize through the ConfigGate

pub mod controller;
pub mod reconciler;
pub mod renewal;
pub mod state;

pub use controller::Controller;
pub use reconciler::{CycleError, CycleOutcome, Reconciler};
pub use renewal::{RenewalTask, SweepOutcome};
pub use state::{ControllerState, CycleSummary, StatusBoard};
