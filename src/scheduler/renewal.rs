//! Recurring trusted-certificate acquisition.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

use crate::certs::{CertError, CertificateManager};
use crate::config::ScheduleConfig;
use crate::lifecycle::Shutdown;
use crate::process::ConfigGate;
use crate::resilience::calculate_backoff;
use crate::routing::RouteStore;

/// Result of one sweep, used to pick the next delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No hosts are routed yet.
    Idle,
    /// Every client run succeeded and any changed material was reloaded.
    Succeeded,
    /// At least one run or the follow-up reload failed.
    Failed,
    /// An overlapping sweep was already running.
    Skipped,
}

/// Runs trusted issuance for the committed host set on its own cadence.
pub struct RenewalTask {
    store: Arc<RouteStore>,
    certs: Arc<CertificateManager>,
    gate: Arc<ConfigGate>,
    schedule: ScheduleConfig,
    trigger: Arc<Notify>,
    reload_pending: bool,
}

impl RenewalTask {
    pub fn new(
        store: Arc<RouteStore>,
        certs: Arc<CertificateManager>,
        gate: Arc<ConfigGate>,
        schedule: ScheduleConfig,
        trigger: Arc<Notify>,
    ) -> Self {
        Self {
            store,
            certs,
            gate,
            schedule,
            trigger,
            reload_pending: false,
        }
    }

    /// Acquire certificates for every committed host, reloading the proxy
    /// when material changed.
    pub async fn sweep(&mut self) -> SweepOutcome {
        let hosts = self.store.snapshot().table.hosts();

        let report = match self.certs.acquire_trusted(&hosts).await {
            Ok(report) => report,
            Err(CertError::NoHosts) => {
                tracing::debug!("No routed hosts, skipping certificate sweep");
                return SweepOutcome::Idle;
            }
            Err(CertError::IssuanceInProgress) => {
                tracing::debug!("Certificate sweep already running");
                return SweepOutcome::Skipped;
            }
            Err(e) => {
                tracing::error!(error = %e, "Certificate sweep failed");
                return SweepOutcome::Failed;
            }
        };

        if report.material_changed() {
            self.reload_pending = true;
        }
        if self.reload_pending {
            match self.gate.reload().await {
                Ok(()) => {
                    tracing::info!(hosts = ?report.changed, "Reloaded proxy with new certificates");
                    self.reload_pending = false;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Reload after issuance failed, will retry");
                    return SweepOutcome::Failed;
                }
            }
        }

        if report.is_success() {
            tracing::info!(hosts = hosts.len(), "Certificate sweep successful");
            SweepOutcome::Succeeded
        } else {
            tracing::warn!(
                failed = report.failures.len(),
                hosts = hosts.len(),
                "Certificate sweep finished with failures"
            );
            SweepOutcome::Failed
        }
    }

    /// Delay before the next sweep given the consecutive failure count.
    pub fn next_delay(&self, consecutive_failures: u32) -> Duration {
        if consecutive_failures == 0 {
            return self.schedule.renewal_interval();
        }
        calculate_backoff(
            consecutive_failures,
            Duration::from_secs(self.schedule.renewal_retry_base_secs),
            Duration::from_secs(self.schedule.renewal_retry_max_secs),
        )
    }

    /// Sweep after the initial delay, then on the renewal interval, early
    /// when nudged by the reconciler, until shutdown.
    pub async fn run(mut self, shutdown: Arc<Shutdown>) {
        let mut shutdown_rx = shutdown.subscribe();
        let mut delay = self.schedule.renewal_initial_delay();
        let mut failures = 0u32;

        tracing::info!(
            interval_secs = self.schedule.renewal_interval_secs,
            "Certificate renewal task starting"
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.trigger.notified() => {
                    tracing::debug!("Certificate sweep requested after route change");
                }
                _ = shutdown_rx.recv() => break,
            }

            match self.sweep().await {
                SweepOutcome::Failed => failures = failures.saturating_add(1),
                SweepOutcome::Skipped => {}
                SweepOutcome::Idle | SweepOutcome::Succeeded => failures = 0,
            }
            delay = self.next_delay(failures);
            tracing::debug!(delay_secs = delay.as_secs(), failures, "Next certificate sweep scheduled");
        }

        tracing::info!("Certificate renewal task stopped");
    }
}
