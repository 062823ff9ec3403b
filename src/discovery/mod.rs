//! Container discovery subsystem.
//!
//! # Data Flow
//! ```text
//! Container runtime (read-only list)
//!     → source.rs (ContainerSource capability, bollard-backed DockerSource)
//!     → ContainerInfo { id, names, labels }
//!     → candidates.rs (label filter, name → upstream)
//!     → Route candidates in discovery order
//! ```
//!
//! # Design Decisions
//! - Discovery is a pure read; it never mutates runtime state
//! - A failed list is transient: the caller skips the cycle
//! - The runtime is behind a trait so reconciliation runs against fakes
//! - Pull-based; a push source can implement the same trait later

pub mod candidates;
pub mod source;

use std::collections::HashMap;

use thiserror::Error;

pub use candidates::{candidate_routes, LabelKeys};
pub use source::{ContainerSource, DockerSource};

/// A running container as reported by the runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub names: Vec<String>,
    pub labels: HashMap<String, String>,
}

/// Errors returned by a container source.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Could not create a client for the runtime.
    #[error("failed to connect to container runtime: {0}")]
    Connect(String),

    /// The list call failed in transport or at the API.
    #[error("failed to list containers: {0}")]
    List(String),
}

impl From<bollard::errors::Error> for DiscoveryError {
    fn from(e: bollard::errors::Error) -> Self {
        DiscoveryError::List(e.to_string())
    }
}
