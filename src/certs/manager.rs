//! Certificate lifecycle: self-signed fallback and trusted issuance.

use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

use crate::certs::issuer::CertificateIssuer;
use crate::certs::paths::{CertLayout, CertState};
use crate::config::IssuancePolicy;
use crate::observability::metrics;
use crate::process::command::CommandError;

/// Certificate errors. Per host unless stated otherwise.
#[derive(Debug, Error)]
pub enum CertError {
    /// Issuance was requested for an empty host set.
    #[error("no hosts to request certificates for")]
    NoHosts,

    /// Another issuance sweep is still running.
    #[error("certificate issuance already in progress")]
    IssuanceInProgress,

    #[error("certificate IO for {host} failed: {source}")]
    Io {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("self-signed certificate for {host} failed: {source}")]
    SelfSigned {
        host: String,
        #[source]
        source: CommandError,
    },

    /// The generator reported success but left material missing.
    #[error("certificate material for {host} missing after generation")]
    Incomplete { host: String },

    #[error("trusted issuance for {} failed: {source}", .hosts.join(", "))]
    Issuance {
        hosts: Vec<String>,
        #[source]
        source: CommandError,
    },
}

/// Result of `ensure` for one host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// Both files were already present.
    Present,
    /// A self-signed placeholder was generated.
    Generated,
}

/// Outcome of one trusted-issuance sweep.
#[derive(Debug, Default)]
pub struct IssuanceReport {
    /// Hosts whose full chain changed on disk.
    pub changed: Vec<String>,
    /// Failed client runs; the fallback material stays in place.
    pub failures: Vec<CertError>,
}

impl IssuanceReport {
    pub fn material_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Guarantees usable certificate material per host and drives issuance.
pub struct CertificateManager {
    layout: CertLayout,
    issuer: Arc<dyn CertificateIssuer>,
    policy: IssuancePolicy,
    issuing: Mutex<()>,
}

impl CertificateManager {
    pub fn new(layout: CertLayout, issuer: Arc<dyn CertificateIssuer>, policy: IssuancePolicy) -> Self {
        Self {
            layout,
            issuer,
            policy,
            issuing: Mutex::new(()),
        }
    }

    /// Make sure `host` has a key and full chain on disk.
    ///
    /// Missing material is replaced by a self-signed pair before returning,
    /// so configuration referencing these paths can be loaded right away.
    pub async fn ensure(&self, host: &str) -> Result<EnsureOutcome, CertError> {
        let paths = self.layout.paths(host);
        let io_err = |source| CertError::Io {
            host: host.to_string(),
            source,
        };

        let key_present = fs::try_exists(&paths.key).await.map_err(io_err)?;
        let chain_present = fs::try_exists(&paths.chain).await.map_err(io_err)?;
        if key_present && chain_present {
            return Ok(EnsureOutcome::Present);
        }

        tracing::info!(host = %host, "No certificate material, generating self-signed fallback");
        fs::create_dir_all(&paths.dir).await.map_err(io_err)?;
        self.issuer
            .self_signed(host, &paths)
            .await
            .map_err(|source| CertError::SelfSigned {
                host: host.to_string(),
                source,
            })?;

        let key_present = fs::try_exists(&paths.key).await.map_err(io_err)?;
        let chain_present = fs::try_exists(&paths.chain).await.map_err(io_err)?;
        if !(key_present && chain_present) {
            return Err(CertError::Incomplete {
                host: host.to_string(),
            });
        }

        metrics::record_self_signed();
        Ok(EnsureOutcome::Generated)
    }

    /// Run the ACME client for every host in `hosts`.
    ///
    /// Client failures are collected in the report rather than returned, so
    /// one host's failure never hides another host's success.
    pub async fn acquire_trusted(&self, hosts: &[String]) -> Result<IssuanceReport, CertError> {
        if hosts.is_empty() {
            return Err(CertError::NoHosts);
        }
        let _guard = self
            .issuing
            .try_lock()
            .map_err(|_| CertError::IssuanceInProgress)?;

        let batches: Vec<Vec<String>> = match self.policy {
            IssuancePolicy::PerHost => hosts.iter().map(|h| vec![h.clone()]).collect(),
            IssuancePolicy::Batched => vec![hosts.to_vec()],
        };

        let mut report = IssuanceReport::default();
        for batch in batches {
            let mut before = Vec::with_capacity(batch.len());
            for host in &batch {
                before.push(self.read_chain(host).await);
            }

            match self.issuer.issue(&batch).await {
                Ok(()) => {
                    metrics::record_issuance(true);
                    for (host, previous) in batch.iter().zip(before) {
                        if self.read_chain(host).await != previous {
                            tracing::info!(host = %host, "Trusted certificate material updated");
                            report.changed.push(host.clone());
                        }
                    }
                }
                Err(source) => {
                    metrics::record_issuance(false);
                    tracing::warn!(
                        hosts = ?batch,
                        error = %source,
                        "Trusted issuance failed, keeping existing material"
                    );
                    report.failures.push(CertError::Issuance {
                        hosts: batch,
                        source,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Observed certificate state for `host`.
    pub async fn inspect(&self, host: &str) -> CertState {
        let paths = self.layout.paths(host);
        if !fs::try_exists(&paths.key).await.unwrap_or(false) {
            return CertState::Absent;
        }
        match fs::read_to_string(&paths.chain).await {
            Ok(chain) => CertState::from_chain(&chain),
            Err(_) => CertState::Absent,
        }
    }

    async fn read_chain(&self, host: &str) -> Option<Vec<u8>> {
        fs::read(self.layout.paths(host).chain).await.ok()
    }
}
