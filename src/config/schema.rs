//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the controller.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the edge controller.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReproxConfig {
    /// Container discovery settings.
    pub discovery: DiscoveryConfig,

    /// Reverse-proxy daemon and generated config file.
    pub proxy: ProxyConfig,

    /// Certificate layout and issuance.
    pub certs: CertConfig,

    /// Reconciliation and renewal cadence.
    pub schedule: ScheduleConfig,

    /// Subprocess execution limits.
    pub commands: CommandConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Read-only admin API.
    pub admin: AdminConfig,
}

/// Container runtime discovery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Label whose value is the hostname to route.
    pub host_label: String,

    /// Optional label appending a port to the upstream.
    pub port_label: String,

    /// Docker endpoint (e.g. "unix:///var/run/docker.sock").
    /// Local defaults (honouring `DOCKER_HOST`) are used when unset.
    pub docker_host: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            host_label: "reprox.host".to_string(),
            port_label: "reprox.port".to_string(),
            docker_host: None,
        }
    }
}

/// Reverse-proxy daemon configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Daemon binary (bare invocation starts it).
    pub binary: String,

    /// Path of the generated configuration file.
    pub config_path: PathBuf,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            binary: "nginx".to_string(),
            config_path: PathBuf::from("/etc/nginx/conf.d/apps.conf"),
        }
    }
}

/// How trusted issuance groups hosts into ACME client runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssuancePolicy {
    /// One ACME run per host; failures are isolated per host.
    #[default]
    PerHost,
    /// A single ACME run covering every host.
    Batched,
}

/// Certificate layout and issuance configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CertConfig {
    /// Directory holding one sub-directory per host.
    pub live_dir: PathBuf,

    /// Contact address handed to the ACME client.
    pub contact_email: String,

    /// ACME client binary.
    pub acme_binary: String,

    /// Arguments placed before the standard flags (authenticator selection).
    pub acme_args: Vec<String>,

    /// Self-signed generator binary.
    pub openssl_binary: String,

    /// Validity of the self-signed fallback in days.
    pub self_signed_days: u32,

    pub policy: IssuancePolicy,
}

impl Default for CertConfig {
    fn default() -> Self {
        Self {
            live_dir: PathBuf::from("/etc/letsencrypt/live"),
            contact_email: String::new(),
            acme_binary: "certbot".to_string(),
            acme_args: vec!["certonly".to_string(), "--nginx".to_string()],
            openssl_binary: "openssl".to_string(),
            self_signed_days: 1,
            policy: IssuancePolicy::PerHost,
        }
    }
}

/// Reconciliation and renewal cadence.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Discovery polling interval in seconds.
    pub poll_interval_secs: u64,

    /// Trusted-certificate sweep interval in seconds.
    pub renewal_interval_secs: u64,

    /// Delay before the first sweep in seconds.
    pub renewal_initial_delay_secs: u64,

    /// Base delay for retrying a failed sweep in seconds.
    pub renewal_retry_base_secs: u64,

    /// Upper bound for the retry delay in seconds.
    pub renewal_retry_max_secs: u64,
}

impl ScheduleConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn renewal_interval(&self) -> Duration {
        Duration::from_secs(self.renewal_interval_secs)
    }

    pub fn renewal_initial_delay(&self) -> Duration {
        Duration::from_secs(self.renewal_initial_delay_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            renewal_interval_secs: 24 * 60 * 60,
            renewal_initial_delay_secs: 5,
            renewal_retry_base_secs: 60 * 60,
            renewal_retry_max_secs: 6 * 60 * 60,
        }
    }
}

/// Subprocess execution limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Per-command timeout in seconds (0 disables the timeout).
    pub timeout_secs: u64,
}

impl CommandConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "reprox=info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
            api_key: String::new(),
        }
    }
}
