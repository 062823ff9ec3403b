//! Atomic, verified configuration file replacement.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Failure to persist a rendered configuration.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("short write to {path}: expected {expected} bytes, found {actual}")]
    Incomplete {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
}

/// Replace `path` with `contents`.
///
/// The bytes go to a sibling temp file which is synced and size-checked
/// before being renamed over the target, so readers see either the old or
/// the complete new file.
pub async fn write_config(path: &Path, contents: &str) -> Result<(), WriteError> {
    let tmp = temp_path(path);
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_err)?;
    }

    let result = async {
        let mut file = fs::File::create(&tmp).await.map_err(io_err)?;
        file.write_all(contents.as_bytes()).await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        drop(file);

        let expected = contents.len() as u64;
        let actual = fs::metadata(&tmp).await.map_err(io_err)?.len();
        if actual != expected {
            return Err(WriteError::Incomplete {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }

        fs::rename(&tmp, path).await.map_err(io_err)
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".reprox-tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.conf");
        std::fs::write(&path, "old contents that are longer").unwrap();

        write_config(&path, "new").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.d").join("apps.conf");

        write_config(&path, "server {}").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "server {}");
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apps.conf");
        std::fs::write(&path, "previous").unwrap();
        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(temp_path(&path)).unwrap();

        let err = write_config(&path, "next").await.unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous");
    }
}
