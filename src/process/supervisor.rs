//! Reverse-proxy daemon control.

use std::time::Duration;

use async_trait::async_trait;

use crate::process::command::{run_command, run_inherited, CommandError, CommandLine};

/// Start, reload and stop signals for the reverse-proxy daemon.
#[async_trait]
pub trait ProxySupervisor: Send + Sync {
    /// Launch the daemon. Failure is fatal to the controller.
    async fn start(&self) -> Result<(), CommandError>;

    /// Ask the running daemon to re-read its configuration.
    async fn reload(&self) -> Result<(), CommandError>;

    /// Ask the daemon to shut down.
    async fn stop(&self) -> Result<(), CommandError>;
}

/// nginx controlled through its signal flags.
#[derive(Debug, Clone)]
pub struct NginxSupervisor {
    binary: String,
    timeout: Option<Duration>,
}

impl NginxSupervisor {
    pub fn new(binary: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    fn signal(&self, name: &str) -> CommandLine {
        CommandLine::new(self.binary.clone(), ["-s", name])
    }
}

#[async_trait]
impl ProxySupervisor for NginxSupervisor {
    async fn start(&self) -> Result<(), CommandError> {
        // The master daemonizes and keeps stderr open, so output is not captured.
        run_inherited(&CommandLine::new(self.binary.clone(), Vec::<String>::new()), self.timeout).await?;
        tracing::info!(binary = %self.binary, "Proxy daemon started");
        Ok(())
    }

    async fn reload(&self) -> Result<(), CommandError> {
        run_command(&self.signal("reload"), self.timeout).await?;
        tracing::info!(binary = %self.binary, "Proxy daemon reloaded");
        Ok(())
    }

    async fn stop(&self) -> Result<(), CommandError> {
        run_command(&self.signal("stop"), self.timeout).await?;
        tracing::info!(binary = %self.binary, "Proxy daemon stopped");
        Ok(())
    }
}
