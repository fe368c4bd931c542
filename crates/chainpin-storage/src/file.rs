//! File checkpoint backend.
//!
//! The file holds one decimal block height and nothing else. Writes go to a
//! sibling `.tmp` file which is then renamed over the target, so a crash
//! mid-write leaves the previous value in place.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use chainpin_core::checkpoint::CheckpointStore;
use chainpin_core::error::CheckpointError;

/// Checkpoint stored as plain text at `path` (`./last-block` by default).
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    fn write_error(&self, e: std::io::Error) -> CheckpointError {
        CheckpointError::Write {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Result<u64, CheckpointError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CheckpointError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(source) => {
                return Err(CheckpointError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        content
            .trim()
            .parse::<u64>()
            .map_err(|_| CheckpointError::Malformed {
                path: self.path.clone(),
                content,
            })
    }

    async fn save(&self, height: u64) -> Result<(), CheckpointError> {
        let tmp = self.tmp_path();
        {
            let mut f = tokio::fs::File::create(&tmp)
                .await
                .map_err(|e| self.write_error(e))?;
            f.write_all(height.to_string().as_bytes())
                .await
                .map_err(|e| self.write_error(e))?;
            f.sync_data().await.map_err(|e| self.write_error(e))?;
        }
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.write_error(e))?;
        tracing::trace!(path = %self.path.display(), block = height, "Wrote checkpoint file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainpin_core::{CheckpointManager, ScanError};

    fn store_in(dir: &tempfile::TempDir) -> FileCheckpointStore {
        FileCheckpointStore::new(dir.path().join("last-block"))
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = store_in(&dir).load().await.unwrap_err();
        assert!(matches!(err, CheckpointError::NotFound { .. }));
    }

    #[tokio::test]
    async fn save_writes_plain_decimal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(19_135_636).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, "19135636");
        assert!(!store.tmp_path().exists());
        assert_eq!(store.load().await.unwrap(), 19_135_636);
    }

    #[tokio::test]
    async fn save_overwrites_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(20_000_123).await.unwrap();
        store.save(7).await.unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "7");
    }

    #[tokio::test]
    async fn load_tolerates_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "  123\n").unwrap();

        assert_eq!(store.load().await.unwrap(), 123);
    }

    #[tokio::test]
    async fn garbage_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "not a number").unwrap();

        match store.load().await.unwrap_err() {
            CheckpointError::Malformed { content, .. } => assert_eq!(content, "not a number"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn directory_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path());
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, CheckpointError::Read { .. }));
    }

    #[tokio::test]
    async fn unwritable_location_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCheckpointStore::new(dir.path().join("missing").join("last-block"));
        let err = store.save(1).await.unwrap_err();
        assert!(matches!(err, CheckpointError::Write { .. }));
        assert!(!ScanError::from(err).is_fatal());
    }

    #[tokio::test]
    async fn manager_resumes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last-block");

        let mut first = CheckpointManager::new(Box::new(FileCheckpointStore::new(&path)), None);
        assert_eq!(first.resolve_start(100).await, 100);
        first.record_pin(150).await;

        let mut second = CheckpointManager::new(Box::new(FileCheckpointStore::new(&path)), None);
        assert_eq!(second.resolve_start(100).await, 150);
    }

    #[tokio::test]
    async fn malformed_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "oops").unwrap();

        let mut mgr = CheckpointManager::new(Box::new(store), None);
        assert_eq!(mgr.resolve_start(42).await, 42);
    }
}
