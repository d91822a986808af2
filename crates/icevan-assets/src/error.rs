//! Error types for the asset store
//!
//! Two families:
//! - Rejections: the request names a folder, file or format outside the
//!   allow-lists. Raised before any filesystem call.
//! - I/O failures: the underlying filesystem call failed. Carry the
//!   relative path and the source error.

use std::io;

/// Main asset store error type
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Folder is not in the allow-list
    #[error("folder not allowed: '{0}'")]
    InvalidFolder(String),

    /// Extension is not in the allow-list
    #[error("unsupported file format: '{0}'")]
    UnsupportedFormat(String),

    /// File name is empty or tries to leave its folder
    #[error("invalid file name: '{0}'")]
    InvalidFilename(String),

    /// Vehicle slug does not match `[a-z0-9]+(-[a-z0-9]+)*`
    #[error("invalid vehicle slug: '{0}'")]
    InvalidSlug(String),

    /// No registered vehicle application with this slug
    #[error("unknown application: '{0}'")]
    UnknownApplication(String),

    /// Named asset does not exist
    #[error("asset not found: {folder}/{filename}")]
    NotFound { folder: String, filename: String },

    /// Another asset already holds the name a write would produce
    #[error("name already taken: {folder}/{filename}")]
    NameTaken { folder: String, filename: String },

    /// Directory listing failed
    #[error("failed to read {folder}: {source}")]
    ReadFailure {
        folder: String,
        #[source]
        source: io::Error,
    },

    /// File or directory creation failed
    #[error("failed to write {path}: {source}")]
    WriteFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    /// File removal failed
    #[error("failed to delete {path}: {source}")]
    DeleteFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    /// File rename failed
    #[error("failed to rename {from} to {to}: {source}")]
    RenameFailure {
        from: String,
        to: String,
        #[source]
        source: io::Error,
    },
}

impl AssetError {
    /// Create write failure for a relative path
    pub fn write_failure(path: impl Into<String>, source: io::Error) -> Self {
        Self::WriteFailure {
            path: path.into(),
            source,
        }
    }

    /// Create delete failure for a relative path
    pub fn delete_failure(path: impl Into<String>, source: io::Error) -> Self {
        Self::DeleteFailure {
            path: path.into(),
            source,
        }
    }

    /// Check if the error was raised by validation, before any I/O
    #[inline]
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidFolder(_)
                | Self::UnsupportedFormat(_)
                | Self::InvalidFilename(_)
                | Self::InvalidSlug(_)
        )
    }

    /// Check if the error names something that does not exist
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownApplication(_))
    }

    /// Check if the error protects an existing asset from being overwritten
    #[inline]
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::NameTaken { .. })
    }

    /// Stable machine-readable name of the variant
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFolder(_) => "invalid_folder",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::InvalidFilename(_) => "invalid_filename",
            Self::InvalidSlug(_) => "invalid_slug",
            Self::UnknownApplication(_) => "unknown_application",
            Self::NotFound { .. } => "not_found",
            Self::NameTaken { .. } => "name_taken",
            Self::ReadFailure { .. } => "read_failure",
            Self::WriteFailure { .. } => "write_failure",
            Self::DeleteFailure { .. } => "delete_failure",
            Self::RenameFailure { .. } => "rename_failure",
        }
    }
}
