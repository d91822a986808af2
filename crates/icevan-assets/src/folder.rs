//! Folder and extension allow-lists
//!
//! Only a closed set of folders under the public root accept listing and
//! uploads: six fixed site sections plus one gallery folder per registered
//! vehicle. Anything else is rejected before touching the filesystem.

use crate::error::AssetError;
use crate::naming::extension_of;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Fixed site-section folders, in admin display order
pub const SECTION_FOLDERS: &[&str] = &[
    "images/hero",
    "images/fotos-servicos",
    "images/empresa",
    "images/og",
    "images/logo",
    "images/formas-pagamento",
];

/// Parent of the per-vehicle gallery folders
pub const APPLICATIONS_ROOT: &str = "images/aplicacoes";

/// Vehicles registered out of the box
pub const DEFAULT_VEHICLE_SLUGS: &[&str] = &[
    "fiorinos",
    "van-ducato",
    "van-sprinter",
    "van-master",
    "expert-porta-frigorifica",
    "fiorino-porta-frigorifica",
];

/// Folder used by the hero slider
pub const HERO_FOLDER: &str = "images/hero";
/// Folder used by the company page
pub const COMPANY_FOLDER: &str = "images/empresa";
/// Folder holding logo variants and the favicon
pub const LOGO_FOLDER: &str = "images/logo";
/// Folder for uploaded videos
pub const VIDEO_FOLDER: &str = "videos";

static SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("static regex"));

/// An allow-listed folder, relative to the public root
///
/// Only obtainable through [`FolderRegistry`], so holding one proves the
/// folder passed the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AssetFolder(String);

impl AssetFolder {
    pub(crate) fn new(relative: impl Into<String>) -> Self {
        Self(relative.into())
    }

    /// Relative path, `/`-separated
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Site-relative URL of a file in this folder
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("/{}/{filename}", self.0)
    }

    /// Relative path of a file in this folder
    #[must_use]
    pub fn join(&self, filename: &str) -> String {
        format!("{}/{filename}", self.0)
    }
}

impl Display for AssetFolder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AssetFolder {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The closed set of folders accepting listing and uploads
#[derive(Debug, Clone)]
pub struct FolderRegistry {
    folders: Vec<AssetFolder>,
    vehicles: Vec<String>,
}

impl FolderRegistry {
    /// Build registry for the given vehicle slugs
    ///
    /// Duplicate slugs are collapsed, first occurrence wins.
    ///
    /// # Errors
    /// Returns `AssetError::InvalidSlug` if a slug is not lower-case
    /// alphanumeric words joined by single dashes.
    pub fn new<I, S>(vehicle_slugs: I) -> Result<Self, AssetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vehicles: Vec<String> = Vec::new();
        for slug in vehicle_slugs {
            let slug = slug.as_ref();
            if !SLUG.is_match(slug) {
                return Err(AssetError::InvalidSlug(slug.to_string()));
            }
            if !vehicles.iter().any(|v| v == slug) {
                vehicles.push(slug.to_string());
            }
        }

        Ok(Self::from_vehicles(vehicles))
    }

    /// Registry with [`DEFAULT_VEHICLE_SLUGS`]
    #[must_use]
    pub fn with_default_vehicles() -> Self {
        Self::from_vehicles(DEFAULT_VEHICLE_SLUGS.iter().map(|s| (*s).to_string()).collect())
    }

    // Slugs must already be validated and deduplicated
    fn from_vehicles(vehicles: Vec<String>) -> Self {
        let folders = SECTION_FOLDERS
            .iter()
            .map(|f| AssetFolder::new(*f))
            .chain(
                vehicles
                    .iter()
                    .map(|slug| AssetFolder::new(format!("{APPLICATIONS_ROOT}/{slug}"))),
            )
            .collect();

        Self { folders, vehicles }
    }

    /// Resolve a requested folder against the allow-list
    ///
    /// Exact string match only; no normalisation is attempted, so
    /// `images/hero/` or `images/../images/hero` are rejected.
    ///
    /// # Errors
    /// Returns `AssetError::InvalidFolder` for anything not allow-listed.
    pub fn resolve(&self, requested: &str) -> Result<AssetFolder, AssetError> {
        self.folders
            .iter()
            .find(|f| f.as_str() == requested)
            .cloned()
            .ok_or_else(|| AssetError::InvalidFolder(requested.to_string()))
    }

    /// Gallery folder of a registered vehicle
    ///
    /// # Errors
    /// Returns `AssetError::UnknownApplication` if the slug is not registered.
    pub fn application(&self, slug: &str) -> Result<AssetFolder, AssetError> {
        if self.vehicles.iter().any(|v| v == slug) {
            Ok(AssetFolder::new(format!("{APPLICATIONS_ROOT}/{slug}")))
        } else {
            Err(AssetError::UnknownApplication(slug.to_string()))
        }
    }

    /// Check if a folder is allow-listed
    #[inline]
    #[must_use]
    pub fn contains(&self, requested: &str) -> bool {
        self.folders.iter().any(|f| f.as_str() == requested)
    }

    /// All allow-listed folders, sections first
    #[inline]
    #[must_use]
    pub fn folders(&self) -> &[AssetFolder] {
        &self.folders
    }

    /// Registered vehicle slugs
    #[inline]
    #[must_use]
    pub fn vehicles(&self) -> &[String] {
        &self.vehicles
    }

    /// Fixed folders that are not part of the positional allow-list
    pub(crate) fn fixed(relative: &str) -> AssetFolder {
        AssetFolder::new(relative)
    }
}

impl Default for FolderRegistry {
    fn default() -> Self {
        Self::with_default_vehicles()
    }
}

/// A closed set of accepted file extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionAllowList {
    extensions: &'static [&'static str],
}

impl ExtensionAllowList {
    /// Images accepted by the positional store
    pub const IMAGES: Self = Self {
        extensions: &["jpg", "jpeg", "png", "webp", "svg", "gif"],
    };

    /// Videos accepted by the video library
    pub const VIDEOS: Self = Self {
        extensions: &["mp4", "webm", "mov", "avi", "mkv"],
    };

    /// Accepted extensions, lower-case, without dots
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Check if a file name carries an accepted extension
    #[inline]
    #[must_use]
    pub fn permits(&self, name: &str) -> bool {
        extension_of(name).is_some_and(|ext| self.extensions.contains(&ext.as_str()))
    }

    /// Accepted lower-cased extension of a file name
    ///
    /// # Errors
    /// Returns `AssetError::UnsupportedFormat` if the extension is missing or
    /// not accepted.
    pub fn accept(&self, name: &str) -> Result<String, AssetError> {
        match extension_of(name) {
            Some(ext) if self.extensions.contains(&ext.as_str()) => Ok(ext),
            _ => Err(AssetError::UnsupportedFormat(name.to_string())),
        }
    }
}
