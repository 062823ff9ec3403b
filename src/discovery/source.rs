//! Container runtime access.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::{Docker, API_DEFAULT_VERSION};

use crate::config::DiscoveryConfig;
use crate::discovery::{ContainerInfo, DiscoveryError};

/// Read-only view of the containers running on this host.
#[async_trait]
pub trait ContainerSource: Send + Sync {
    /// List running containers in runtime order.
    async fn list(&self) -> Result<Vec<ContainerInfo>, DiscoveryError>;
}

/// Docker Engine API source.
#[derive(Clone)]
pub struct DockerSource {
    docker: Docker,
}

impl DockerSource {
    /// Connect to the configured endpoint, or to local defaults.
    pub fn connect(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let docker = match config.docker_host.as_deref() {
            Some(host) if host.starts_with("unix://") => {
                Docker::connect_with_socket(host, 120, API_DEFAULT_VERSION)
            }
            Some(host) => Docker::connect_with_http(host, 120, API_DEFAULT_VERSION),
            None => Docker::connect_with_local_defaults(),
        }
        .map_err(|e| DiscoveryError::Connect(e.to_string()))?;

        Ok(Self { docker })
    }

    /// Verify the daemon answers before the controller starts.
    pub async fn ping(&self) -> Result<(), DiscoveryError> {
        self.docker
            .ping()
            .await
            .map_err(|e| DiscoveryError::Connect(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ContainerSource for DockerSource {
    async fn list(&self) -> Result<Vec<ContainerInfo>, DiscoveryError> {
        let options = ListContainersOptions::<String> {
            all: false,
            filters: HashMap::new(),
            ..Default::default()
        };

        let summaries = self.docker.list_containers(Some(options)).await?;

        Ok(summaries
            .into_iter()
            .map(|summary| ContainerInfo {
                id: summary.id.unwrap_or_default(),
                names: summary.names.unwrap_or_default(),
                labels: summary.labels.unwrap_or_default(),
            })
            .collect())
    }
}
