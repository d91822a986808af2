//! Positional Asset Store
//!
//! Keeps an ordered set of images per allow-listed folder. Order is the
//! byte-wise order of the filenames and a file's position is its index in
//! that order; nothing else is persisted.
//!
//! # Operations
//!
//! - `list`: ordered assets of a folder
//! - `append`: write under the next prefix
//! - `save_as`: write under an exact name
//! - `replace` / `replace_at`: swap a file for new content under its prefix
//! - `delete`: remove a file, never renumbering the rest
//! - `rename`: move a file to a new name in the same folder
//!
//! Every request is validated against the folder and extension allow-lists
//! before the backend is touched.

use crate::asset::{Asset, DeleteOutcome, Replacement, StoredAsset};
use crate::backend::{AssetBackend, LocalFsBackend};
use crate::error::AssetError;
use crate::folder::{AssetFolder, ExtensionAllowList, FolderRegistry};
use crate::locks::{FolderGuard, FolderLocks};
use crate::naming::{ensure_plain_filename, positional_name, PositionPrefix};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How `append` picks the prefix of a new file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextPositionPolicy {
    /// Number of listed assets plus one
    ///
    /// After a delete from the middle this reuses the prefix of a surviving
    /// file.
    #[default]
    Count,
    /// Highest parsed prefix plus one, `01` for a folder without prefixes
    MaxPrefix,
}

impl NextPositionPolicy {
    /// Prefix for the next appended file given the current sorted names
    #[must_use]
    pub fn next_prefix(self, sorted_names: &[String]) -> PositionPrefix {
        match self {
            Self::Count => PositionPrefix::from_index(sorted_names.len()),
            Self::MaxPrefix => sorted_names
                .iter()
                .filter_map(|name| PositionPrefix::parse(name))
                .max()
                .map_or(PositionPrefix::new(1), PositionPrefix::next),
        }
    }
}

/// Store behaviour knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub next_position: NextPositionPolicy,
    /// Hold a per-folder lock across list-then-write
    pub serialize_writes: bool,
}

impl StoreConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_next_position(mut self, policy: NextPositionPolicy) -> Self {
        self.next_position = policy;
        self
    }

    #[must_use]
    pub fn with_serialized_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            next_position: NextPositionPolicy::Count,
            serialize_writes: true,
        }
    }
}

/// Positional image store over a backend
pub struct PositionalStore<B = LocalFsBackend> {
    backend: Arc<B>,
    registry: Arc<FolderRegistry>,
    config: StoreConfig,
    locks: FolderLocks,
}

impl<B> Clone for PositionalStore<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            registry: Arc::clone(&self.registry),
            config: self.config,
            locks: self.locks.clone(),
        }
    }
}

impl<B: AssetBackend> PositionalStore<B> {
    /// Create store with default config
    pub fn new(backend: B, registry: FolderRegistry) -> Self {
        Self {
            backend: Arc::new(backend),
            registry: Arc::new(registry),
            config: StoreConfig::default(),
            locks: FolderLocks::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    #[inline]
    pub fn registry(&self) -> &FolderRegistry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    pub(crate) fn locks(&self) -> &FolderLocks {
        &self.locks
    }

    /// Ordered assets of an allow-listed folder
    ///
    /// Files whose extension is not an accepted image are skipped. A folder
    /// that does not exist yet is empty.
    ///
    /// # Errors
    /// `InvalidFolder` if the folder is not allow-listed, `ReadFailure` if
    /// the listing fails.
    pub async fn list(&self, folder: &str) -> Result<Vec<Asset>, AssetError> {
        let folder = self.registry.resolve(folder)?;
        self.list_in(&folder).await
    }

    /// Ordered assets of an already-resolved folder
    ///
    /// # Errors
    /// `ReadFailure` if the listing fails.
    pub async fn list_in(&self, folder: &AssetFolder) -> Result<Vec<Asset>, AssetError> {
        let names = self.sorted_image_names(folder).await?;
        debug!(folder = %folder, count = names.len(), "Listed assets");
        Ok(names
            .into_iter()
            .enumerate()
            .map(|(position, filename)| Asset::new(folder.clone(), filename, position))
            .collect())
    }

    /// Write a new file at the next position
    ///
    /// The stored name is `<prefix>-<clean name>.<ext>`, where the clean
    /// name is `original_name` without its extension and without one leading
    /// `<digits>-`.
    ///
    /// # Errors
    /// `InvalidFolder` or `UnsupportedFormat` before any I/O; `ReadFailure`
    /// or `WriteFailure` from the backend.
    pub async fn append(
        &self,
        folder: &str,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<StoredAsset, AssetError> {
        let folder = self.registry.resolve(folder)?;
        let extension = ExtensionAllowList::IMAGES.accept(original_name)?;

        let _guard = self.guard(&folder).await;
        let names = self.sorted_image_names(&folder).await?;
        let prefix = self.config.next_position.next_prefix(&names);
        let filename = positional_name(prefix, original_name, &extension);
        ensure_plain_filename(&filename)?;

        self.backend.ensure_dir(&folder).await?;
        self.backend.write(&folder, &filename, bytes).await?;

        metrics::counter!("icevan_assets_written_total", "operation" => "append").increment(1);
        info!(
            folder = %folder,
            filename = %filename,
            position = names.len(),
            size = bytes.len(),
            "Appended asset"
        );
        Ok(StoredAsset::new(&folder, filename))
    }

    /// Write a file under an exact name, overwriting any existing one
    ///
    /// # Errors
    /// `InvalidFolder`, `InvalidFilename` or `UnsupportedFormat` before any
    /// I/O; `WriteFailure` from the backend.
    pub async fn save_as(
        &self,
        folder: &str,
        bytes: &[u8],
        filename: &str,
    ) -> Result<StoredAsset, AssetError> {
        let folder = self.registry.resolve(folder)?;
        let filename = ensure_plain_filename(filename.trim())?.to_string();
        ExtensionAllowList::IMAGES.accept(&filename)?;

        let _guard = self.guard(&folder).await;
        self.backend.ensure_dir(&folder).await?;
        self.backend.write(&folder, &filename, bytes).await?;

        metrics::counter!("icevan_assets_written_total", "operation" => "save_as").increment(1);
        info!(folder = %folder, filename = %filename, size = bytes.len(), "Saved asset");
        Ok(StoredAsset::new(&folder, filename))
    }

    /// Replace `target` with new content under the same prefix
    ///
    /// The prefix is parsed from `target` itself. A target without a prefix
    /// takes the one its listing position implies, the number of listed
    /// names sorting before it.
    ///
    /// # Errors
    /// See [`Self::replace_at`].
    pub async fn replace(
        &self,
        folder: &str,
        target: &str,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<Replacement, AssetError> {
        let folder = self.registry.resolve(folder)?;
        let target = ensure_plain_filename(target)?;
        let extension = ExtensionAllowList::IMAGES.accept(original_name)?;

        let _guard = self.guard(&folder).await;
        let names = self.sorted_image_names(&folder).await?;
        let position = names
            .iter()
            .filter(|name| name.as_str() < target)
            .count();
        let prefix =
            PositionPrefix::parse(target).unwrap_or_else(|| PositionPrefix::from_index(position));
        self.replace_slot(&folder, target, prefix, position, bytes, original_name, &extension)
            .await
    }

    /// Replace `target` with new content at a caller-known position
    ///
    /// The new name takes the prefix `position + 1` and the extension of
    /// `original_name`, which may differ from the old one. The content is
    /// staged under a hidden name first; the old file is removed only once
    /// staging succeeded, and a failed removal discards the staged file.
    /// A new name already held by another file is refused before anything
    /// is written.
    ///
    /// # Errors
    /// `InvalidFolder`, `InvalidFilename` or `UnsupportedFormat` before any
    /// I/O; `NameTaken` if the new name belongs to a different file;
    /// `ReadFailure`, `WriteFailure`, `DeleteFailure` or `RenameFailure`
    /// from the backend.
    pub async fn replace_at(
        &self,
        folder: &str,
        target: &str,
        position: usize,
        bytes: &[u8],
        original_name: &str,
    ) -> Result<Replacement, AssetError> {
        let folder = self.registry.resolve(folder)?;
        let target = ensure_plain_filename(target)?;
        let extension = ExtensionAllowList::IMAGES.accept(original_name)?;

        let _guard = self.guard(&folder).await;
        let prefix = PositionPrefix::from_index(position);
        self.replace_slot(&folder, target, prefix, position, bytes, original_name, &extension)
            .await
    }

    /// Remove a file; no other file is renumbered
    ///
    /// # Errors
    /// `InvalidFolder` or `InvalidFilename` before any I/O; `DeleteFailure`
    /// from the backend.
    pub async fn delete(&self, folder: &str, filename: &str) -> Result<DeleteOutcome, AssetError> {
        let folder = self.registry.resolve(folder)?;
        let filename = ensure_plain_filename(filename)?;

        let _guard = self.guard(&folder).await;
        let outcome = if self.backend.remove(&folder, filename).await? {
            metrics::counter!("icevan_assets_deleted_total", "operation" => "delete").increment(1);
            DeleteOutcome::Removed
        } else {
            DeleteOutcome::AlreadyAbsent
        };

        info!(folder = %folder, filename = %filename, ?outcome, "Deleted asset");
        Ok(outcome)
    }

    /// Rename a file inside its folder
    ///
    /// # Errors
    /// `InvalidFolder`, `InvalidFilename` or `UnsupportedFormat` (for the new
    /// name) before any I/O; `NotFound` if `from` does not exist;
    /// `RenameFailure` otherwise.
    pub async fn rename(&self, folder: &str, from: &str, to: &str) -> Result<(), AssetError> {
        let folder = self.registry.resolve(folder)?;
        let from = ensure_plain_filename(from)?;
        let to = ensure_plain_filename(to.trim())?;
        ExtensionAllowList::IMAGES.accept(to)?;

        let _guard = self.guard(&folder).await;
        self.backend.rename(&folder, from, to).await?;

        info!(folder = %folder, from = %from, to = %to, "Renamed asset");
        Ok(())
    }

    async fn sorted_image_names(&self, folder: &AssetFolder) -> Result<Vec<String>, AssetError> {
        let mut names: Vec<String> = self
            .backend
            .list_names(folder)
            .await?
            .into_iter()
            .filter(|name| ExtensionAllowList::IMAGES.permits(name))
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    async fn guard(&self, folder: &AssetFolder) -> Option<FolderGuard> {
        if self.config.serialize_writes {
            Some(self.locks.acquire(folder).await)
        } else {
            None
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn replace_slot(
        &self,
        folder: &AssetFolder,
        target: &str,
        prefix: PositionPrefix,
        position: usize,
        bytes: &[u8],
        original_name: &str,
        extension: &str,
    ) -> Result<Replacement, AssetError> {
        let filename = positional_name(prefix, original_name, extension);
        ensure_plain_filename(&filename)?;

        // The final rename would overwrite whatever already holds the name
        if filename != target && self.backend.list_names(folder).await?.contains(&filename) {
            warn!(
                folder = %folder,
                replaced = %target,
                filename = %filename,
                "Replacement name held by another asset"
            );
            return Err(AssetError::NameTaken {
                folder: folder.to_string(),
                filename,
            });
        }

        let staged = format!(".{}.upload", uuid::Uuid::new_v4());

        self.backend.ensure_dir(folder).await?;
        self.backend.write(folder, &staged, bytes).await?;

        if let Err(e) = self.backend.remove(folder, target).await {
            if let Err(cleanup) = self.backend.remove(folder, &staged).await {
                warn!(folder = %folder, staged = %staged, error = %cleanup, "Failed to discard staged upload");
            }
            return Err(e);
        }

        if let Err(e) = self.backend.rename(folder, &staged, &filename).await {
            error!(
                folder = %folder,
                replaced = %target,
                staged = %staged,
                error = %e,
                "Replaced asset removed but staged upload could not be moved into place"
            );
            return Err(e);
        }

        metrics::counter!("icevan_assets_written_total", "operation" => "replace").increment(1);
        metrics::counter!("icevan_assets_deleted_total", "operation" => "replace").increment(1);
        info!(
            folder = %folder,
            replaced = %target,
            filename = %filename,
            position,
            "Replaced asset"
        );
        Ok(Replacement {
            stored: StoredAsset::new(folder, filename),
            replaced: target.to_string(),
            position,
        })
    }
}
