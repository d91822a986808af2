//! Asset records returned by the store

use crate::folder::AssetFolder;
use crate::naming::PositionPrefix;
use serde::Serialize;

/// One stored file inside an allow-listed folder
///
/// `position` is derived from the folder listing, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub filename: String,
    pub folder: AssetFolder,
    pub position: usize,
    #[serde(skip)]
    pub prefix: Option<PositionPrefix>,
}

impl Asset {
    pub(crate) fn new(folder: AssetFolder, filename: String, position: usize) -> Self {
        let prefix = PositionPrefix::parse(&filename);
        Self {
            filename,
            folder,
            position,
            prefix,
        }
    }

    /// Site-relative URL
    #[must_use]
    pub fn url(&self) -> String {
        self.folder.url_for(&self.filename)
    }

    /// Position 0 pairs with a gallery as its thumbnail in vehicle folders
    #[inline]
    #[must_use]
    pub fn is_thumbnail_slot(&self) -> bool {
        self.position == 0
    }
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredAsset {
    pub filename: String,
    pub url: String,
    /// Cache-busting token in Unix milliseconds; not persisted
    pub timestamp: i64,
}

impl StoredAsset {
    pub(crate) fn new(folder: &AssetFolder, filename: String) -> Self {
        Self {
            url: folder.url_for(&filename),
            filename,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Result of a positional replace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub stored: StoredAsset,
    /// Name that occupied the slot before
    pub replaced: String,
    /// Zero-based position the new file took over
    pub position: usize,
}

/// Outcome of an idempotent delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    AlreadyAbsent,
}

impl DeleteOutcome {
    #[inline]
    #[must_use]
    pub fn was_removed(self) -> bool {
        matches!(self, Self::Removed)
    }
}
