//! reprox: edge controller keeping nginx routes and TLS certificates in sync
//! with the containers running on this host.

pub mod admin;
pub mod certs;
pub mod config;
pub mod discovery;
pub mod lifecycle;
pub mod observability;
pub mod process;
pub mod render;
pub mod resilience;
pub mod routing;
pub mod scheduler;

pub use config::ReproxConfig;
pub use lifecycle::Shutdown;
pub use scheduler::Controller;
