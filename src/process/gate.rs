//! Serialized config application.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::observability::metrics;
use crate::process::command::CommandError;
use crate::process::supervisor::ProxySupervisor;
use crate::process::writer::{write_config, WriteError};

/// Failure while applying configuration to the daemon.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Write(#[from] WriteError),

    #[error("reload failed: {0}")]
    Reload(#[source] CommandError),
}

/// Single entry point for everything that touches the live daemon config.
///
/// Route-driven "write then reload" and issuance-driven reloads share one
/// lock so they never interleave.
pub struct ConfigGate {
    config_path: PathBuf,
    supervisor: Arc<dyn ProxySupervisor>,
    lock: Mutex<()>,
}

impl ConfigGate {
    pub fn new(config_path: impl Into<PathBuf>, supervisor: Arc<dyn ProxySupervisor>) -> Self {
        Self {
            config_path: config_path.into(),
            supervisor,
            lock: Mutex::new(()),
        }
    }

    pub fn supervisor(&self) -> &Arc<dyn ProxySupervisor> {
        &self.supervisor
    }

    /// Write the rendered config, then reload. A failed write skips the reload.
    pub async fn apply(&self, rendered: &str) -> Result<(), ApplyError> {
        let _guard = self.lock.lock().await;
        write_config(&self.config_path, rendered).await?;
        tracing::debug!(path = %self.config_path.display(), bytes = rendered.len(), "Config written");
        self.reload_locked().await
    }

    /// Reload without touching the config file.
    pub async fn reload(&self) -> Result<(), ApplyError> {
        let _guard = self.lock.lock().await;
        self.reload_locked().await
    }

    async fn reload_locked(&self) -> Result<(), ApplyError> {
        match self.supervisor.reload().await {
            Ok(()) => {
                metrics::record_reload(true);
                Ok(())
            }
            Err(e) => {
                metrics::record_reload(false);
                Err(ApplyError::Reload(e))
            }
        }
    }
}
