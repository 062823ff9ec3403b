//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Connect to the container runtime
//! - Build the production collaborators in dependency order
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and exits non-zero
//! - The proxy daemon is started by the controller, not here

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::certs::{CertLayout, CertificateManager, ToolIssuer};
use crate::config::{load_config, ConfigError, ReproxConfig};
use crate::discovery::{DiscoveryError, DockerSource, LabelKeys};
use crate::process::{CommandError, ConfigGate, NginxSupervisor};
use crate::render::NginxRenderer;
use crate::scheduler::Controller;

/// Unrecoverable failures before or while entering `Running`.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("container runtime unavailable: {0}")]
    Runtime(#[from] DiscoveryError),

    #[error("proxy daemon failed to start: {0}")]
    ProxyStart(#[source] CommandError),
}

/// Load the configuration file (if any) and environment overrides.
pub fn load(path: Option<&Path>) -> Result<ReproxConfig, StartupError> {
    Ok(load_config(path)?)
}

/// Wire production collaborators into a controller.
pub async fn build_controller(config: &ReproxConfig) -> Result<Controller, StartupError> {
    let source = DockerSource::connect(&config.discovery)?;
    source.ping().await?;
    tracing::info!("Connected to container runtime");

    if config.certs.contact_email.is_empty() {
        tracing::warn!("No ACME contact address configured; registering without email");
    }

    let timeout = config.commands.timeout();
    let layout = CertLayout::new(config.certs.live_dir.clone());
    let issuer = Arc::new(ToolIssuer::new(&config.certs, timeout));
    let certs = Arc::new(CertificateManager::new(layout.clone(), issuer, config.certs.policy));
    let supervisor = Arc::new(NginxSupervisor::new(config.proxy.binary.clone(), timeout));
    let gate = Arc::new(ConfigGate::new(config.proxy.config_path.clone(), supervisor));

    Ok(Controller::new(
        Arc::new(source),
        LabelKeys {
            host: config.discovery.host_label.clone(),
            port: config.discovery.port_label.clone(),
        },
        certs,
        NginxRenderer::new(layout),
        gate,
        config.schedule.clone(),
    ))
}
