//! Per-host certificate file layout.

use std::path::PathBuf;

use serde::Serialize;

pub const KEY_FILE: &str = "privkey.pem";
pub const CHAIN_FILE: &str = "fullchain.pem";

/// Root directory holding one sub-directory per host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertLayout {
    live_dir: PathBuf,
}

/// Key and full-chain paths for a single host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertPaths {
    pub dir: PathBuf,
    pub key: PathBuf,
    pub chain: PathBuf,
}

impl CertLayout {
    pub fn new(live_dir: impl Into<PathBuf>) -> Self {
        Self {
            live_dir: live_dir.into(),
        }
    }

    pub fn paths(&self, host: &str) -> CertPaths {
        let dir = self.live_dir.join(host);
        CertPaths {
            key: dir.join(KEY_FILE),
            chain: dir.join(CHAIN_FILE),
            dir,
        }
    }
}

/// Certificate material state as observed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CertState {
    Absent,
    SelfSigned,
    Trusted,
}

impl CertState {
    /// Classify a host from the contents of its full-chain file.
    ///
    /// A CA-issued chain carries at least one intermediate after the leaf;
    /// the self-signed fallback is a single certificate.
    pub fn from_chain(chain: &str) -> Self {
        match chain.matches("-----BEGIN CERTIFICATE-----").count() {
            0 => CertState::Absent,
            1 => CertState::SelfSigned,
            _ => CertState::Trusted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_derived_from_host() {
        let layout = CertLayout::new("/etc/letsencrypt/live");
        let paths = layout.paths("a.example.com");
        assert_eq!(paths.dir, PathBuf::from("/etc/letsencrypt/live/a.example.com"));
        assert_eq!(paths.key, PathBuf::from("/etc/letsencrypt/live/a.example.com/privkey.pem"));
        assert_eq!(paths.chain, PathBuf::from("/etc/letsencrypt/live/a.example.com/fullchain.pem"));
    }

    #[test]
    fn test_state_from_chain() {
        let block = "-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";
        assert_eq!(CertState::from_chain(""), CertState::Absent);
        assert_eq!(CertState::from_chain(block), CertState::SelfSigned);
        assert_eq!(CertState::from_chain(&block.repeat(2)), CertState::Trusted);
    }
}
