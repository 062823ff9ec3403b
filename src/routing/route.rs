//! Route value object.
//!
//! # Design Decisions
//! - Hosts are normalized to lowercase (DNS names are case-insensitive)
//! - Both fields are validated at construction so rendered configuration
//!   can never carry injected directives

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Errors raised when building a route from discovered metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("upstream must not be empty")]
    EmptyUpstream,

    #[error("invalid host '{0}'")]
    InvalidHost(String),

    #[error("invalid upstream '{0}'")]
    InvalidUpstream(String),
}

/// Mapping from a public hostname to a backend upstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    host: String,
    upstream: String,
}

impl Route {
    /// Build a validated route.
    pub fn new(host: impl AsRef<str>, upstream: impl AsRef<str>) -> Result<Self, RouteError> {
        let host = host.as_ref().trim().to_ascii_lowercase();
        let upstream = upstream.as_ref().trim();

        if host.is_empty() {
            return Err(RouteError::EmptyHost);
        }
        if upstream.is_empty() {
            return Err(RouteError::EmptyUpstream);
        }
        if !is_valid_host(&host) {
            return Err(RouteError::InvalidHost(host));
        }
        if !is_valid_upstream(upstream) {
            return Err(RouteError::InvalidUpstream(upstream.to_string()));
        }

        Ok(Self {
            host,
            upstream: upstream.to_string(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.host, self.upstream)
    }
}

fn is_valid_host(host: &str) -> bool {
    let name = host.strip_prefix("*.").unwrap_or(host);
    host.len() <= 253
        && !name.is_empty()
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

/// `name` or `name:port`, with the port in 1..=65535.
fn is_valid_upstream(upstream: &str) -> bool {
    let (name, port) = match upstream.split_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (upstream, None),
    };
    let name_ok = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'));
    let port_ok = match port {
        None => true,
        Some(port) => {
            port.bytes().all(|b| b.is_ascii_digit())
                && matches!(port.parse::<u16>(), Ok(p) if p > 0)
        }
    };
    name_ok && port_ok
}
