//! Checkpoint manager — persists the scanner's position for crash recovery.
//!
//! The checkpoint is a single block height. On restart the scanner resumes
//! from it instead of the configured start block. Persistence is best-effort:
//! a failed write is logged and the scan carries on.

use async_trait::async_trait;

use crate::error::CheckpointError;

/// Trait for storing and loading the checkpoint height.
///
/// Implementations include `MemoryCheckpointStore` and the file-backed
/// `FileCheckpointStore` in `chainpin-storage`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the persisted height.
    async fn load(&self) -> Result<u64, CheckpointError>;

    /// Overwrite the persisted height.
    async fn save(&self, height: u64) -> Result<(), CheckpointError>;
}

/// Manages checkpoint reads/writes for the scanner.
pub struct CheckpointManager {
    store: Box<dyn CheckpointStore>,
    /// Persist every N completed blocks. `None` = only after successful pins.
    save_interval: Option<u64>,
    /// Blocks completed since the last interval save.
    counter: u64,
    /// Highest height loaded or persisted; never written below.
    high_water: Option<u64>,
}

impl CheckpointManager {
    pub fn new(store: Box<dyn CheckpointStore>, save_interval: Option<u64>) -> Self {
        Self {
            store,
            save_interval: save_interval.filter(|n| *n > 0),
            counter: 0,
            high_water: None,
        }
    }

    /// Returns the height to start scanning from.
    ///
    /// Falls back to `default` when nothing usable is stored.
    pub async fn resolve_start(&mut self, default: u64) -> u64 {
        match self.store.load().await {
            Ok(height) => {
                tracing::info!(block = height, "Using stored last block as the first block to process");
                self.high_water = Some(height);
                height
            }
            Err(e) => {
                tracing::error!(error = %e, start = default, "Unable to read last block, using configured start block");
                default
            }
        }
    }

    /// Persist `height` after a successful pin in that block.
    pub async fn record_pin(&mut self, height: u64) {
        self.persist(height).await;
    }

    /// Call after every fully processed block with the next height to scan.
    pub async fn block_completed(&mut self, next_height: u64) {
        let Some(interval) = self.save_interval else {
            return;
        };
        self.counter += 1;
        if self.counter >= interval {
            self.persist(next_height).await;
            self.counter = 0;
        }
    }

    /// Last height this manager loaded or wrote.
    pub fn high_water(&self) -> Option<u64> {
        self.high_water
    }

    async fn persist(&mut self, height: u64) {
        if let Some(hw) = self.high_water {
            if height < hw {
                tracing::warn!(block = height, stored = hw, "Refusing to move checkpoint backwards");
                return;
            }
        }
        match self.store.save(height).await {
            Ok(()) => {
                tracing::debug!(block = height, "Checkpoint saved");
                self.high_water = Some(height);
            }
            Err(e) => tracing::error!(error = %e, block = height, "Unable to write current block file"),
        }
    }
}

// ─── In-memory store (for testing) ────────────────────────────────────────────

use std::sync::{Arc, Mutex};

/// In-memory checkpoint store for tests and ephemeral runs.
///
/// Clones share the same slot, so a test can keep a handle after boxing one
/// into a `CheckpointManager`.
#[derive(Debug, Clone, Default)]
pub struct MemoryCheckpointStore {
    slot: Arc<Mutex<Option<u64>>>,
    writes: Arc<Mutex<Vec<u64>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `height`.
    pub fn with_height(height: u64) -> Self {
        let store = Self::default();
        *store.slot.lock().unwrap() = Some(height);
        store
    }

    /// Currently stored height.
    pub fn height(&self) -> Option<u64> {
        *self.slot.lock().unwrap()
    }

    /// Every successful write, oldest first.
    pub fn writes(&self) -> Vec<u64> {
        self.writes.lock().unwrap().clone()
    }

    /// Make subsequent writes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self) -> Result<u64, CheckpointError> {
        self.height().ok_or_else(|| CheckpointError::NotFound {
            path: "memory".into(),
        })
    }

    async fn save(&self, height: u64) -> Result<(), CheckpointError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(CheckpointError::Write {
                path: "memory".into(),
                reason: "writes disabled".into(),
            });
        }
        *self.slot.lock().unwrap() = Some(height);
        self.writes.lock().unwrap().push(height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_start_falls_back_when_empty() {
        let store = MemoryCheckpointStore::new();
        let mut mgr = CheckpointManager::new(Box::new(store), None);
        assert_eq!(mgr.resolve_start(19_135_636).await, 19_135_636);
        assert_eq!(mgr.high_water(), None);
    }

    #[tokio::test]
    async fn resolve_start_prefers_stored_height() {
        let store = MemoryCheckpointStore::with_height(20_000_000);
        let mut mgr = CheckpointManager::new(Box::new(store), None);
        assert_eq!(mgr.resolve_start(19_135_636).await, 20_000_000);
    }

    #[tokio::test]
    async fn record_pin_never_moves_backwards() {
        let store = MemoryCheckpointStore::with_height(500);
        let mut mgr = CheckpointManager::new(Box::new(store.clone()), None);
        mgr.resolve_start(0).await;

        mgr.record_pin(499).await;
        assert_eq!(store.height(), Some(500));
        assert!(store.writes().is_empty());

        mgr.record_pin(501).await;
        mgr.record_pin(501).await;
        assert_eq!(store.writes(), vec![501, 501]);
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let store = MemoryCheckpointStore::new();
        store.set_fail_writes(true);
        let mut mgr = CheckpointManager::new(Box::new(store.clone()), None);

        mgr.record_pin(10).await;
        assert_eq!(store.height(), None);
        assert_eq!(mgr.high_water(), None);

        store.set_fail_writes(false);
        mgr.record_pin(11).await;
        assert_eq!(store.height(), Some(11));
    }

    #[tokio::test]
    async fn block_completed_without_interval_does_not_save() {
        let store = MemoryCheckpointStore::new();
        let mut mgr = CheckpointManager::new(Box::new(store.clone()), None);
        for next in 1..=50 {
            mgr.block_completed(next).await;
        }
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn block_completed_save_interval() {
        let store = MemoryCheckpointStore::new();
        let mut mgr = CheckpointManager::new(Box::new(store.clone()), Some(5));

        // 4 blocks: no save yet
        for next in 101..=104 {
            mgr.block_completed(next).await;
        }
        assert!(store.writes().is_empty());

        // 5th block saves the next height to scan
        mgr.block_completed(105).await;
        assert_eq!(store.writes(), vec![105]);
    }

    #[tokio::test]
    async fn zero_interval_means_disabled() {
        let store = MemoryCheckpointStore::new();
        let mut mgr = CheckpointManager::new(Box::new(store.clone()), Some(0));
        mgr.block_completed(1).await;
        assert!(store.writes().is_empty());
    }
}
