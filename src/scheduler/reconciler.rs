//! One reconciliation cycle: discover → diff → ensure → render → write → reload.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Notify;

use crate::certs::CertificateManager;
use crate::discovery::{candidate_routes, ContainerSource, DiscoveryError, LabelKeys};
use crate::observability::metrics;
use crate::process::{ApplyError, CommandError, ConfigGate, WriteError};
use crate::render::{NginxRenderer, RenderError};
use crate::routing::{diff, RouteStore, RouteTable};
use crate::scheduler::state::{CycleSummary, StatusBoard};

/// A cycle that stopped before committing a new table.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("config write failed: {0}")]
    Write(#[source] WriteError),

    #[error("proxy reload failed: {0}")]
    Reload(#[source] CommandError),

    /// Another writer committed while this cycle was applying.
    #[error("route table changed concurrently at version {0}")]
    Conflict(u64),
}

impl From<ApplyError> for CycleError {
    fn from(e: ApplyError) -> Self {
        match e {
            ApplyError::Write(e) => CycleError::Write(e),
            ApplyError::Reload(e) => CycleError::Reload(e),
        }
    }
}

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Discovered routes match the committed table; nothing was touched.
    Unchanged,
    /// A new table was rendered, written, reloaded and committed.
    Applied { version: u64, routes: usize },
    /// Some hosts were left out because their certificate material could
    /// not be produced. `applied` tells whether the remaining table was
    /// written and committed.
    Partial {
        applied: bool,
        version: u64,
        routes: usize,
        withheld: Vec<String>,
    },
}

/// Drives reconciliation cycles against the shared route store.
pub struct Reconciler {
    source: Arc<dyn ContainerSource>,
    labels: LabelKeys,
    store: Arc<RouteStore>,
    certs: Arc<CertificateManager>,
    renderer: NginxRenderer,
    gate: Arc<ConfigGate>,
    issuance_trigger: Arc<Notify>,
    status: Arc<StatusBoard>,
}

impl Reconciler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn ContainerSource>,
        labels: LabelKeys,
        store: Arc<RouteStore>,
        certs: Arc<CertificateManager>,
        renderer: NginxRenderer,
        gate: Arc<ConfigGate>,
        issuance_trigger: Arc<Notify>,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            source,
            labels,
            store,
            certs,
            renderer,
            gate,
            issuance_trigger,
            status,
        }
    }

    /// Run one cycle.
    ///
    /// Any failing stage aborts the rest of the cycle and leaves the
    /// committed table (and therefore the live config) untouched.
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        let containers = self.source.list().await?;
        let (candidate, dropped) =
            RouteTable::from_candidates(candidate_routes(&containers, &self.labels));
        for duplicate in &dropped {
            tracing::warn!(
                host = %duplicate.kept.host(),
                kept = %duplicate.kept.upstream(),
                dropped = %duplicate.dropped.upstream(),
                "Duplicate host label, last discovered container wins"
            );
        }

        let current = self.store.snapshot();
        if !diff(&current.table, &candidate) {
            return Ok(CycleOutcome::Unchanged);
        }

        // Hosts without material are left out of this cycle; the candidate
        // will differ from the committed table next time and be retried.
        let mut withheld = Vec::new();
        for route in candidate.iter() {
            if let Err(e) = self.certs.ensure(route.host()).await {
                tracing::error!(host = %route.host(), error = %e, "Certificate unavailable, route withheld");
                withheld.push(route.host().to_string());
            }
        }
        let table = if withheld.is_empty() {
            candidate
        } else {
            let failed: HashSet<&str> = withheld.iter().map(String::as_str).collect();
            candidate.retain(|r| !failed.contains(r.host()))
        };
        if !diff(&current.table, &table) {
            if withheld.is_empty() {
                return Ok(CycleOutcome::Unchanged);
            }
            return Ok(CycleOutcome::Partial {
                applied: false,
                version: current.version,
                routes: current.table.len(),
                withheld,
            });
        }

        let rendered = self.renderer.render(&table)?;
        self.gate.apply(&rendered).await?;

        let routes = table.len();
        let version = self
            .store
            .commit(current.version, table)
            .await
            .ok_or(CycleError::Conflict(current.version))?;

        if withheld.is_empty() {
            Ok(CycleOutcome::Applied { version, routes })
        } else {
            Ok(CycleOutcome::Partial {
                applied: true,
                version,
                routes,
                withheld,
            })
        }
    }

    /// Run a cycle and report it. Errors are logged, never propagated.
    pub async fn tick(&self) -> Option<CycleOutcome> {
        match self.run_cycle().await {
            Ok(CycleOutcome::Unchanged) => {
                tracing::debug!("Routes unchanged");
                metrics::record_cycle("unchanged");
                self.status.record_cycle(CycleSummary::new(
                    "unchanged",
                    self.store.snapshot().version,
                    None,
                ));
                Some(CycleOutcome::Unchanged)
            }
            Ok(CycleOutcome::Applied { version, routes }) => {
                tracing::info!(version, routes, "Routes updated and proxy reloaded");
                metrics::record_cycle("applied");
                metrics::record_routes(routes);
                self.status
                    .record_cycle(CycleSummary::new("applied", version, None));
                if routes > 0 {
                    self.issuance_trigger.notify_one();
                }
                Some(CycleOutcome::Applied { version, routes })
            }
            Ok(CycleOutcome::Partial {
                applied,
                version,
                routes,
                withheld,
            }) => {
                tracing::warn!(
                    applied,
                    version,
                    routes,
                    withheld = ?withheld,
                    "Reconciliation left hosts without certificate material out"
                );
                metrics::record_cycle("partial");
                if applied {
                    metrics::record_routes(routes);
                }
                self.status.record_cycle(CycleSummary::new(
                    "partial",
                    version,
                    Some(format!(
                        "certificate material unavailable for: {}",
                        withheld.join(", ")
                    )),
                ));
                if applied && routes > 0 {
                    self.issuance_trigger.notify_one();
                }
                Some(CycleOutcome::Partial {
                    applied,
                    version,
                    routes,
                    withheld,
                })
            }
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation cycle failed, keeping last applied configuration");
                metrics::record_cycle("failed");
                self.status.record_cycle(CycleSummary::new(
                    "failed",
                    self.store.snapshot().version,
                    Some(e.to_string()),
                ));
                None
            }
        }
    }
}
