//! Certificate subsystem.
//!
//! # Lifecycle (per host, filesystem only)
//! ```text
//! absent ──ensure()──▶ self-signed ──acquire_trusted() ok──▶ trusted
//!                                                         ◀──┘ renewal
//! ```
//!
//! # Design Decisions
//! - `ensure` is synchronous with the reconciliation cycle: config that
//!   references a host's files is never rendered before they exist
//! - Issuance failures are non-fatal; the fallback keeps TLS terminating
//! - At most one issuance sweep runs at a time
//! - Material is never deleted here

pub mod issuer;
pub mod manager;
pub mod paths;

pub use issuer::{CertificateIssuer, ToolIssuer};
pub use manager::{CertError, CertificateManager, EnsureOutcome, IssuanceReport};
pub use paths::{CertLayout, CertPaths, CertState};
