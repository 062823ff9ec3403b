//! Turning container metadata into route candidates.

use crate::discovery::ContainerInfo;
use crate::routing::Route;

/// Label keys consulted on each container.
#[derive(Debug, Clone)]
pub struct LabelKeys {
    pub host: String,
    pub port: String,
}

impl Default for LabelKeys {
    fn default() -> Self {
        Self {
            host: "reprox.host".to_string(),
            port: "reprox.port".to_string(),
        }
    }
}

/// Build one route per qualifying container, in discovery order.
///
/// Containers without a name or without a non-empty host label are skipped.
/// Invalid hosts or upstreams are skipped with a warning.
pub fn candidate_routes(containers: &[ContainerInfo], keys: &LabelKeys) -> Vec<Route> {
    let mut routes = Vec::new();

    for container in containers {
        let Some(name) = container.names.first() else {
            continue;
        };
        let host = match container.labels.get(&keys.host) {
            Some(host) if !host.trim().is_empty() => host,
            _ => continue,
        };

        let name = name.trim_start_matches('/');
        let upstream = match container.labels.get(&keys.port).map(|p| p.trim()) {
            Some(port) if !port.is_empty() => match port.parse::<u16>() {
                Ok(port) if port > 0 => format!("{}:{}", name, port),
                _ => {
                    tracing::warn!(
                        container = %container.id,
                        host = %host,
                        port = %port,
                        "Skipping container with invalid port label"
                    );
                    continue;
                }
            },
            _ => name.to_string(),
        };

        match Route::new(host, &upstream) {
            Ok(route) => routes.push(route),
            Err(e) => {
                tracing::warn!(
                    container = %container.id,
                    host = %host,
                    upstream = %upstream,
                    error = %e,
                    "Skipping container with invalid route labels"
                );
            }
        }
    }

    routes
}
