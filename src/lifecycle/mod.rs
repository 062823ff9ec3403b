//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Connect runtime → Build controller
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → shutdown.rs trigger
//!
//! Shutdown (shutdown.rs):
//!     Trigger → loops finish current unit of work → daemon stop → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then runtime, then the daemon
//! - Shutdown never interrupts a running subprocess

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::StartupError;
