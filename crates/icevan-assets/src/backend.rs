//! Storage backend seam
//!
//! The store only ever speaks in folder-relative names; the backend maps
//! them onto real storage. All paths are `/`-separated and relative to the
//! public root.

use crate::error::AssetError;
use crate::folder::AssetFolder;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Filesystem operations the positional store depends on
#[async_trait]
pub trait AssetBackend: Send + Sync {
    /// Names of the regular files in a folder, unsorted
    ///
    /// A folder that does not exist yet lists as empty.
    async fn list_names(&self, folder: &AssetFolder) -> Result<Vec<String>, AssetError>;

    /// Create the folder and its parents if missing
    async fn ensure_dir(&self, folder: &AssetFolder) -> Result<(), AssetError>;

    /// Write a file, replacing any existing one
    async fn write(&self, folder: &AssetFolder, name: &str, bytes: &[u8])
        -> Result<(), AssetError>;

    /// Remove a file; returns `false` if it did not exist
    async fn remove(&self, folder: &AssetFolder, name: &str) -> Result<bool, AssetError>;

    /// Rename a file inside one folder
    async fn rename(&self, folder: &AssetFolder, from: &str, to: &str) -> Result<(), AssetError>;
}

/// Backend over a local directory tree
#[derive(Debug, Clone)]
pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Public root every folder is resolved against
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, folder: &AssetFolder) -> PathBuf {
        folder
            .as_str()
            .split('/')
            .fold(self.root.clone(), |path, part| path.join(part))
    }

    fn file(&self, folder: &AssetFolder, name: &str) -> PathBuf {
        self.dir(folder).join(name)
    }
}

#[async_trait]
impl AssetBackend for LocalFsBackend {
    async fn list_names(&self, folder: &AssetFolder) -> Result<Vec<String>, AssetError> {
        let read_failure = |source| AssetError::ReadFailure {
            folder: folder.to_string(),
            source,
        };

        let mut entries = match tokio::fs::read_dir(self.dir(folder)).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(read_failure(e)),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_failure)? {
            let file_type = entry.file_type().await.map_err(read_failure)?;
            if file_type.is_dir() {
                continue;
            }
            // Non-UTF-8 names are skipped
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn ensure_dir(&self, folder: &AssetFolder) -> Result<(), AssetError> {
        tokio::fs::create_dir_all(self.dir(folder))
            .await
            .map_err(|e| AssetError::write_failure(folder.as_str(), e))
    }

    async fn write(
        &self,
        folder: &AssetFolder,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), AssetError> {
        tokio::fs::write(self.file(folder, name), bytes)
            .await
            .map_err(|e| AssetError::write_failure(folder.join(name), e))
    }

    async fn remove(&self, folder: &AssetFolder, name: &str) -> Result<bool, AssetError> {
        match tokio::fs::remove_file(self.file(folder, name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AssetError::delete_failure(folder.join(name), e)),
        }
    }

    async fn rename(&self, folder: &AssetFolder, from: &str, to: &str) -> Result<(), AssetError> {
        match tokio::fs::rename(self.file(folder, from), self.file(folder, to)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(AssetError::NotFound {
                folder: folder.to_string(),
                filename: from.to_string(),
            }),
            Err(source) => Err(AssetError::RenameFailure {
                from: folder.join(from),
                to: folder.join(to),
                source,
            }),
        }
    }
}
