//! Certificate tooling invoked as subprocesses.

use std::time::Duration;

use async_trait::async_trait;

use crate::certs::paths::CertPaths;
use crate::config::CertConfig;
use crate::process::command::{run_command, CommandError, CommandLine};

/// External tools that produce certificate material.
#[async_trait]
pub trait CertificateIssuer: Send + Sync {
    /// Generate a short-lived self-signed pair for `host` at `paths`.
    async fn self_signed(&self, host: &str, paths: &CertPaths) -> Result<(), CommandError>;

    /// Obtain a trusted certificate covering `hosts` in one client run.
    async fn issue(&self, hosts: &[String]) -> Result<(), CommandError>;
}

/// openssl for the fallback, an ACME client (certbot) for trusted issuance.
#[derive(Debug, Clone)]
pub struct ToolIssuer {
    openssl: String,
    self_signed_days: u32,
    acme_binary: String,
    acme_args: Vec<String>,
    contact_email: String,
    timeout: Option<Duration>,
}

impl ToolIssuer {
    pub fn new(config: &CertConfig, timeout: Option<Duration>) -> Self {
        Self {
            openssl: config.openssl_binary.clone(),
            self_signed_days: config.self_signed_days,
            acme_binary: config.acme_binary.clone(),
            acme_args: config.acme_args.clone(),
            contact_email: config.contact_email.clone(),
            timeout,
        }
    }

    fn self_signed_command(&self, host: &str, paths: &CertPaths) -> CommandLine {
        CommandLine::new(
            self.openssl.clone(),
            [
                "req".to_string(),
                "-x509".to_string(),
                "-newkey".to_string(),
                "rsa:4096".to_string(),
                "-keyout".to_string(),
                paths.key.display().to_string(),
                "-out".to_string(),
                paths.chain.display().to_string(),
                "-days".to_string(),
                self.self_signed_days.to_string(),
                "-nodes".to_string(),
                "-subj".to_string(),
                format!("/CN={}", host),
            ],
        )
    }

    fn issue_command(&self, hosts: &[String]) -> CommandLine {
        let mut args = self.acme_args.clone();
        args.push("--non-interactive".to_string());
        args.push("--agree-tos".to_string());
        if self.contact_email.is_empty() {
            args.push("--register-unsafely-without-email".to_string());
        } else {
            args.push("--email".to_string());
            args.push(self.contact_email.clone());
        }
        if let [host] = hosts {
            args.push("--cert-name".to_string());
            args.push(host.clone());
        } else {
            args.push("--expand".to_string());
        }
        for host in hosts {
            args.push("--domains".to_string());
            args.push(host.clone());
        }
        CommandLine::new(self.acme_binary.clone(), args)
    }
}

#[async_trait]
impl CertificateIssuer for ToolIssuer {
    async fn self_signed(&self, host: &str, paths: &CertPaths) -> Result<(), CommandError> {
        run_command(&self.self_signed_command(host, paths), self.timeout).await?;
        Ok(())
    }

    async fn issue(&self, hosts: &[String]) -> Result<(), CommandError> {
        let output = run_command(&self.issue_command(hosts), self.timeout).await?;
        tracing::debug!(hosts = ?hosts, output = %output.trim(), "ACME client finished");
        Ok(())
    }
}
