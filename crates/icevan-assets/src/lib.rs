//! Ice Van Assets - Positional Asset Store
//!
//! File-backed image slots for the marketing site:
//! - Allow-listed folders and extensions, checked before any I/O
//! - `NN-<name>.<ext>` naming where byte-wise filename order is display order
//! - Append, replace-in-place, save-as, rename and non-compacting delete
//! - Optional per-folder serialization of mutations
//! - Read-models for galleries, hero slides and logos
//! - Video uploads
//!
//! # Example
//!
//! ```rust,ignore
//! use icevan_assets::{FolderRegistry, LocalFsBackend, PositionalStore};
//!
//! # async fn example() -> Result<(), icevan_assets::AssetError> {
//! let store = PositionalStore::new(LocalFsBackend::new("public"), FolderRegistry::default());
//!
//! let stored = store.append("images/hero", b"...", "banner.webp").await?;
//! assert_eq!(stored.filename, "01-banner.webp");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod asset;
pub mod backend;
pub mod catalog;
pub mod error;
pub mod folder;
pub mod locks;
pub mod media;
pub mod naming;
pub mod store;

// Re-exports for convenience
pub use asset::{Asset, DeleteOutcome, Replacement, StoredAsset};
pub use backend::{AssetBackend, LocalFsBackend};
pub use catalog::{ApplicationGallery, Catalog, HeroSlide, LogoKind, LogoSet};
pub use error::AssetError;
pub use folder::{
    AssetFolder, ExtensionAllowList, FolderRegistry, APPLICATIONS_ROOT, DEFAULT_VEHICLE_SLUGS,
    SECTION_FOLDERS, VIDEO_FOLDER,
};
pub use locks::FolderLocks;
pub use media::VideoLibrary;
pub use naming::PositionPrefix;
pub use store::{NextPositionPolicy, PositionalStore, StoreConfig};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the asset store
    pub use crate::{
        Asset, AssetBackend, AssetError, Catalog, FolderRegistry, LocalFsBackend,
        NextPositionPolicy, PositionalStore, StoreConfig, StoredAsset, VideoLibrary,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
