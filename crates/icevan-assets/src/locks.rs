//! Per-folder write serialization
//!
//! Mutations compute names from a listing and then write; two of them
//! interleaving on one folder can pick the same name. Holding the folder
//! guard across list-then-write removes that window. Different folders never
//! contend.

use crate::folder::AssetFolder;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Guard held for the duration of one folder mutation
pub type FolderGuard = OwnedMutexGuard<()>;

/// Lazily created async mutex per folder
#[derive(Debug, Clone, Default)]
pub struct FolderLocks {
    locks: Arc<DashMap<AssetFolder, Arc<Mutex<()>>>>,
}

impl FolderLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to a folder
    pub async fn acquire(&self, folder: &AssetFolder) -> FolderGuard {
        // Clone out of the map so no shard lock is held across the await
        let lock = self
            .locks
            .entry(folder.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of folders that have been locked at least once
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks.len()
    }
}
