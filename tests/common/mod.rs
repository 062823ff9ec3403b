//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use reprox::certs::{CertLayout, CertPaths, CertificateIssuer, CertificateManager};
use reprox::config::IssuancePolicy;
use reprox::discovery::{ContainerInfo, ContainerSource, DiscoveryError};
use reprox::process::{CommandCause, CommandError, ConfigGate, ProxySupervisor};

pub const CERT_BLOCK: &str = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

pub fn container(name: &str, host: &str) -> ContainerInfo {
    let mut labels = HashMap::new();
    labels.insert("reprox.host".to_string(), host.to_string());
    ContainerInfo {
        id: format!("id-{}", name.trim_start_matches('/')),
        names: vec![name.to_string()],
        labels,
    }
}

pub fn command_failure(command: &str) -> CommandError {
    CommandError {
        command: command.to_string(),
        output: "simulated failure".to_string(),
        cause: CommandCause::Spawn(std::io::Error::other("simulated failure")),
    }
}

/// Container source returning whatever the test scripts next.
#[derive(Default)]
pub struct FakeSource {
    containers: Mutex<Vec<ContainerInfo>>,
    failing: AtomicBool,
}

impl FakeSource {
    pub fn set(&self, containers: Vec<ContainerInfo>) {
        *self.containers.lock().unwrap() = containers;
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerSource for FakeSource {
    async fn list(&self) -> Result<Vec<ContainerInfo>, DiscoveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DiscoveryError::List("connection refused".to_string()));
        }
        Ok(self.containers.lock().unwrap().clone())
    }
}

/// Daemon double that records calls and checks, on every reload, that each
/// certificate referenced by the written config exists.
pub struct FakeSupervisor {
    config_path: PathBuf,
    pub calls: Mutex<Vec<&'static str>>,
    pub fail_start: AtomicBool,
    pub fail_reload: AtomicBool,
    pub missing_certs: Mutex<Vec<String>>,
}

impl FakeSupervisor {
    pub fn new(config_path: &Path) -> Self {
        Self {
            config_path: config_path.to_path_buf(),
            calls: Mutex::new(Vec::new()),
            fail_start: AtomicBool::new(false),
            fail_reload: AtomicBool::new(false),
            missing_certs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        self.calls().iter().filter(|c| **c == "reload").count()
    }

    fn check_referenced_certs(&self) {
        let config = std::fs::read_to_string(&self.config_path).unwrap_or_default();
        for line in config.lines() {
            let line = line.trim();
            let path = line
                .strip_prefix("ssl_certificate_key ")
                .or_else(|| line.strip_prefix("ssl_certificate "));
            if let Some(path) = path {
                let path = path.trim_end_matches(';');
                if !Path::new(path).exists() {
                    self.missing_certs.lock().unwrap().push(path.to_string());
                }
            }
        }
    }
}

#[async_trait]
impl ProxySupervisor for FakeSupervisor {
    async fn start(&self) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push("start");
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(command_failure("nginx"));
        }
        Ok(())
    }

    async fn reload(&self) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push("reload");
        if self.fail_reload.load(Ordering::SeqCst) {
            return Err(command_failure("nginx -s reload"));
        }
        self.check_referenced_certs();
        Ok(())
    }

    async fn stop(&self) -> Result<(), CommandError> {
        self.calls.lock().unwrap().push("stop");
        Ok(())
    }
}

/// Certificate tooling double writing PEM-shaped files.
pub struct FakeIssuer {
    live_dir: PathBuf,
    pub fail_issue: AtomicBool,
    pub fail_self_signed_for: Mutex<Vec<String>>,
    pub issued: Mutex<Vec<Vec<String>>>,
}

impl FakeIssuer {
    pub fn new(live_dir: &Path) -> Self {
        Self {
            live_dir: live_dir.to_path_buf(),
            fail_issue: AtomicBool::new(false),
            fail_self_signed_for: Mutex::new(Vec::new()),
            issued: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CertificateIssuer for FakeIssuer {
    async fn self_signed(&self, host: &str, paths: &CertPaths) -> Result<(), CommandError> {
        if self.fail_self_signed_for.lock().unwrap().iter().any(|h| h == host) {
            return Err(command_failure("openssl"));
        }
        std::fs::write(&paths.key, "self-signed-key").unwrap();
        std::fs::write(&paths.chain, CERT_BLOCK).unwrap();
        Ok(())
    }

    async fn issue(&self, hosts: &[String]) -> Result<(), CommandError> {
        self.issued.lock().unwrap().push(hosts.to_vec());
        if self.fail_issue.load(Ordering::SeqCst) {
            return Err(command_failure("certbot"));
        }
        for host in hosts {
            let dir = self.live_dir.join(host);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("privkey.pem"), "trusted-key").unwrap();
            std::fs::write(dir.join("fullchain.pem"), CERT_BLOCK.repeat(2)).unwrap();
        }
        Ok(())
    }
}

/// All fakes wired over one temp directory.
pub struct Harness {
    pub dir: tempfile::TempDir,
    pub config_path: PathBuf,
    pub live_dir: PathBuf,
    pub source: Arc<FakeSource>,
    pub supervisor: Arc<FakeSupervisor>,
    pub issuer: Arc<FakeIssuer>,
    pub certs: Arc<CertificateManager>,
    pub gate: Arc<ConfigGate>,
}

impl Harness {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nginx").join("apps.conf");
        let live_dir = dir.path().join("live");
        std::fs::create_dir_all(&live_dir).unwrap();

        let source = Arc::new(FakeSource::default());
        let supervisor = Arc::new(FakeSupervisor::new(&config_path));
        let issuer = Arc::new(FakeIssuer::new(&live_dir));
        let certs = Arc::new(CertificateManager::new(
            CertLayout::new(&live_dir),
            issuer.clone(),
            IssuancePolicy::PerHost,
        ));
        let gate = Arc::new(ConfigGate::new(&config_path, supervisor.clone()));

        Self {
            dir,
            config_path,
            live_dir,
            source,
            supervisor,
            issuer,
            certs,
            gate,
        }
    }

    pub fn layout(&self) -> CertLayout {
        CertLayout::new(&self.live_dir)
    }

    pub fn config_contents(&self) -> Option<String> {
        std::fs::read_to_string(&self.config_path).ok()
    }
}
