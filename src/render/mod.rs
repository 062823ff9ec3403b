//! Proxy configuration rendering.
//!
//! # Design Decisions
//! - Pure: no filesystem or network access
//! - Deterministic: output depends only on route order and content
//! - Certificate paths come from the same layout the certificate manager uses

pub mod nginx;

pub use nginx::{NginxRenderer, RenderError};
