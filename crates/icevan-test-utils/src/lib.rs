//! Testing utilities for the Ice Van workspace
//!
//! Shared fixtures: a temporary public root, a fault-injecting backend and a
//! multipart body builder.

#![allow(missing_docs)]

use async_trait::async_trait;
use icevan_assets::{
    AssetBackend, AssetError, AssetFolder, FolderRegistry, LocalFsBackend, PositionalStore,
    StoreConfig,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Temporary public root with helpers to seed and inspect folders
pub struct PublicDirFixture {
    dir: TempDir,
}

impl PublicDirFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn folder_path(&self, folder: &str) -> PathBuf {
        folder
            .split('/')
            .fold(self.dir.path().to_path_buf(), |path, part| path.join(part))
    }

    /// Create files whose content is their own name
    pub fn seed(&self, folder: &str, names: &[&str]) -> &Self {
        let dir = self.folder_path(folder);
        std::fs::create_dir_all(&dir).unwrap();
        for name in names {
            std::fs::write(dir.join(name), name.as_bytes()).unwrap();
        }
        self
    }

    /// Every file name in a folder, hidden ones included, sorted
    pub fn names(&self, folder: &str) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.folder_path(folder)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .collect();
        names.sort();
        names
    }

    pub fn read(&self, folder: &str, name: &str) -> Vec<u8> {
        std::fs::read(self.folder_path(folder).join(name)).unwrap()
    }

    pub fn exists(&self, folder: &str, name: &str) -> bool {
        self.folder_path(folder).join(name).exists()
    }

    pub fn store(&self) -> PositionalStore {
        PositionalStore::new(LocalFsBackend::new(self.path()), FolderRegistry::default())
    }

    pub fn store_with(&self, config: StoreConfig) -> PositionalStore {
        self.store().with_config(config)
    }

    pub fn faulty_store(&self) -> PositionalStore<FaultyBackend> {
        PositionalStore::new(FaultyBackend::new(self.path()), FolderRegistry::default())
    }
}

impl Default for PublicDirFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Local backend with switchable failures and a mutation counter
#[derive(Debug, Clone)]
pub struct FaultyBackend {
    inner: LocalFsBackend,
    fail_write: Arc<AtomicBool>,
    fail_remove: Arc<AtomicBool>,
    fail_rename: Arc<AtomicBool>,
    mutations: Arc<AtomicUsize>,
}

impl FaultyBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: LocalFsBackend::new(root),
            fail_write: Arc::new(AtomicBool::new(false)),
            fail_remove: Arc::new(AtomicBool::new(false)),
            fail_rename: Arc::new(AtomicBool::new(false)),
            mutations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_write.store(on, Ordering::SeqCst);
    }

    pub fn fail_removes(&self, on: bool) {
        self.fail_remove.store(on, Ordering::SeqCst);
    }

    pub fn fail_renames(&self, on: bool) {
        self.fail_rename.store(on, Ordering::SeqCst);
    }

    /// Number of mutating calls that reached the backend
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn injected() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
    }

    fn record(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AssetBackend for FaultyBackend {
    async fn list_names(&self, folder: &AssetFolder) -> Result<Vec<String>, AssetError> {
        self.inner.list_names(folder).await
    }

    async fn ensure_dir(&self, folder: &AssetFolder) -> Result<(), AssetError> {
        self.record();
        self.inner.ensure_dir(folder).await
    }

    async fn write(
        &self,
        folder: &AssetFolder,
        name: &str,
        bytes: &[u8],
    ) -> Result<(), AssetError> {
        self.record();
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(AssetError::write_failure(folder.join(name), Self::injected()));
        }
        self.inner.write(folder, name, bytes).await
    }

    async fn remove(&self, folder: &AssetFolder, name: &str) -> Result<bool, AssetError> {
        self.record();
        // Staged uploads are always removable so cleanup can be observed
        if self.fail_remove.load(Ordering::SeqCst) && !name.ends_with(".upload") {
            return Err(AssetError::delete_failure(folder.join(name), Self::injected()));
        }
        self.inner.remove(folder, name).await
    }

    async fn rename(&self, folder: &AssetFolder, from: &str, to: &str) -> Result<(), AssetError> {
        self.record();
        if self.fail_rename.load(Ordering::SeqCst) {
            return Err(AssetError::RenameFailure {
                from: folder.join(from),
                to: folder.join(to),
                source: Self::injected(),
            });
        }
        self.inner.rename(folder, from, to).await
    }
}

/// Boundary used by [`MultipartBody`]
pub const MULTIPART_BOUNDARY: &str = "icevan-test-boundary";

/// Builder for `multipart/form-data` request bodies
#[derive(Debug, Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}")
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}
