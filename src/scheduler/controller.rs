//! Top-level lifecycle: Starting → Running → Stopping → Stopped.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::{self, MissedTickBehavior};

use crate::certs::CertificateManager;
use crate::config::ScheduleConfig;
use crate::discovery::{ContainerSource, LabelKeys};
use crate::lifecycle::{Shutdown, StartupError};
use crate::process::ConfigGate;
use crate::render::NginxRenderer;
use crate::routing::RouteStore;
use crate::scheduler::reconciler::Reconciler;
use crate::scheduler::renewal::RenewalTask;
use crate::scheduler::state::{ControllerState, StatusBoard};

/// Owns the reconciliation loop and the renewal task.
pub struct Controller {
    reconciler: Reconciler,
    renewal: RenewalTask,
    gate: Arc<ConfigGate>,
    schedule: ScheduleConfig,
    store: Arc<RouteStore>,
    certs: Arc<CertificateManager>,
    status: Arc<StatusBoard>,
}

impl Controller {
    pub fn new(
        source: Arc<dyn ContainerSource>,
        labels: LabelKeys,
        certs: Arc<CertificateManager>,
        renderer: NginxRenderer,
        gate: Arc<ConfigGate>,
        schedule: ScheduleConfig,
    ) -> Self {
        let store = Arc::new(RouteStore::new());
        let status = Arc::new(StatusBoard::new());
        let trigger = Arc::new(Notify::new());

        let reconciler = Reconciler::new(
            source,
            labels,
            store.clone(),
            certs.clone(),
            renderer,
            gate.clone(),
            trigger.clone(),
            status.clone(),
        );
        let renewal = RenewalTask::new(
            store.clone(),
            certs.clone(),
            gate.clone(),
            schedule.clone(),
            trigger,
        );

        Self {
            reconciler,
            renewal,
            gate,
            schedule,
            store,
            certs,
            status,
        }
    }

    pub fn store(&self) -> Arc<RouteStore> {
        self.store.clone()
    }

    pub fn certs(&self) -> Arc<CertificateManager> {
        self.certs.clone()
    }

    pub fn status(&self) -> Arc<StatusBoard> {
        self.status.clone()
    }

    /// Start the daemon, reconcile until shutdown, then stop the daemon.
    ///
    /// Only a failed daemon start is returned as an error.
    pub async fn run(self, shutdown: Arc<Shutdown>) -> Result<(), StartupError> {
        let Controller {
            reconciler,
            renewal,
            gate,
            schedule,
            status,
            ..
        } = self;

        if let Err(e) = gate.supervisor().start().await {
            tracing::error!(error = %e, "Proxy daemon failed to start");
            status.transition(ControllerState::Stopped);
            return Err(StartupError::ProxyStart(e));
        }
        status.transition(ControllerState::Running);

        let renewal_handle = tokio::spawn(renewal.run(shutdown.clone()));

        let mut shutdown_rx = shutdown.subscribe();
        let mut ticker = time::interval(schedule.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_secs = schedule.poll_interval_secs,
            "Reconciliation loop starting"
        );

        loop {
            if shutdown.is_triggered() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown_rx.recv() => break,
            }
            reconciler.tick().await;
        }

        status.transition(ControllerState::Stopping);
        shutdown.trigger();
        if let Err(e) = renewal_handle.await {
            tracing::error!(error = %e, "Certificate renewal task panicked");
        }

        if let Err(e) = gate.supervisor().stop().await {
            tracing::error!(error = %e, "Proxy daemon did not stop cleanly");
        }
        status.transition(ControllerState::Stopped);

        Ok(())
    }
}
