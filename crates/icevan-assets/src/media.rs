//! Video uploads
//!
//! Videos are not positional: they keep a slugified form of the upload name
//! and live in a single folder outside the image allow-list.

use crate::asset::StoredAsset;
use crate::backend::{AssetBackend, LocalFsBackend};
use crate::error::AssetError;
use crate::folder::{AssetFolder, ExtensionAllowList, FolderRegistry, VIDEO_FOLDER};
use crate::naming::{ensure_plain_filename, slugify_media_name};
use crate::store::PositionalStore;
use tracing::info;

/// Writer for the video folder
pub struct VideoLibrary<B = LocalFsBackend> {
    store: PositionalStore<B>,
    folder: AssetFolder,
}

impl<B> Clone for VideoLibrary<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            folder: self.folder.clone(),
        }
    }
}

impl<B: AssetBackend> VideoLibrary<B> {
    /// Share the backend and folder locks of a store
    pub fn new(store: PositionalStore<B>) -> Self {
        Self {
            store,
            folder: FolderRegistry::fixed(VIDEO_FOLDER),
        }
    }

    #[inline]
    pub fn folder(&self) -> &AssetFolder {
        &self.folder
    }

    /// Store a video under its slugified name, overwriting a namesake
    ///
    /// # Errors
    /// `UnsupportedFormat` or `InvalidFilename` before any I/O;
    /// `WriteFailure` from the backend.
    pub async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<StoredAsset, AssetError> {
        ExtensionAllowList::VIDEOS.accept(original_name)?;
        let filename = slugify_media_name(original_name);
        ensure_plain_filename(&filename)?;

        let backend = self.store.backend();
        let _guard = if self.store.config().serialize_writes {
            Some(self.store.locks().acquire(&self.folder).await)
        } else {
            None
        };
        backend.ensure_dir(&self.folder).await?;
        backend.write(&self.folder, &filename, bytes).await?;

        metrics::counter!("icevan_assets_written_total", "operation" => "video").increment(1);
        info!(folder = %self.folder, filename = %filename, size = bytes.len(), "Uploaded video");
        Ok(StoredAsset::new(&self.folder, filename))
    }
}
