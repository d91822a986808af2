//! Positional file naming
//!
//! Stored images are named `NN-<name>.<ext>`: a zero-padded positional
//! prefix, a human-readable base name taken from the upload, and the
//! lower-cased extension. Order inside a folder is the byte-wise order of
//! these names, which equals numeric order only while every prefix has the
//! same width.

use crate::error::AssetError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display, Formatter};

/// Width the prefix is zero-padded to
pub const PREFIX_WIDTH: usize = 2;

/// Sort order assigned to names without a numeric prefix
pub const UNORDERED_SORT_ORDER: u32 = 999;

static LEADING_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-").expect("static regex"));
static TRAILING_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[^/.]+$").expect("static regex"));
static MEDIA_UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9.\-_]").expect("static regex"));
static DASH_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").expect("static regex"));

/// One-based position prefix of a stored asset
///
/// Displays zero-padded to [`PREFIX_WIDTH`] digits. Values of 100 and above
/// render with three digits and no longer sort correctly against two-digit
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionPrefix(u32);

impl PositionPrefix {
    /// Create prefix from its numeric value
    #[inline]
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Prefix for a zero-based position
    #[inline]
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX).saturating_add(1))
    }

    /// Parse the leading `<digits>-` of a filename
    #[must_use]
    pub fn parse(filename: &str) -> Option<Self> {
        LEADING_PREFIX
            .captures(filename)
            .and_then(|caps| caps[1].parse::<u32>().ok())
            .map(Self)
    }

    /// Numeric value
    #[inline]
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Prefix that follows this one
    #[inline]
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Display for PositionPrefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = PREFIX_WIDTH)
    }
}

/// Last path component of a client-supplied name
///
/// Browsers send bare names, but nothing forces a client to.
#[must_use]
pub fn file_basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Lower-cased extension without the dot
///
/// Dot-files (`.jpg`) and names ending in a dot have no extension.
#[must_use]
pub fn extension_of(name: &str) -> Option<String> {
    let base = file_basename(name);
    match base.rfind('.') {
        Some(0) | None => None,
        Some(idx) if idx + 1 == base.len() => None,
        Some(idx) => Some(base[idx + 1..].to_ascii_lowercase()),
    }
}

/// Human-readable part of an upload name
///
/// Drops the extension and one leading `<digits>-`, so re-uploading a file
/// downloaded from the site does not stack prefixes.
#[must_use]
pub fn clean_base_name(original: &str) -> String {
    let base = file_basename(original);
    let without_ext = TRAILING_EXTENSION.replace(base, "");
    LEADING_PREFIX.replace(&without_ext, "").into_owned()
}

/// Build `<prefix>-<clean name>.<ext>`
#[must_use]
pub fn positional_name(prefix: PositionPrefix, original: &str, extension: &str) -> String {
    format!("{prefix}-{}.{extension}", clean_base_name(original))
}

/// Reject names that are empty or could escape their folder
///
/// # Errors
/// Returns `AssetError::InvalidFilename` for empty names, `.`/`..`, names
/// with path separators or NUL bytes.
pub fn ensure_plain_filename(name: &str) -> Result<&str, AssetError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0']);
    if plain {
        Ok(name)
    } else {
        Err(AssetError::InvalidFilename(name.to_string()))
    }
}

/// Explicit sort key derived from the prefix
#[must_use]
pub fn sort_order(filename: &str) -> u32 {
    PositionPrefix::parse(filename).map_or(UNORDERED_SORT_ORDER, PositionPrefix::value)
}

/// Storage name for uploaded media
///
/// Lower-cases, maps anything outside `[a-z0-9._-]` to `-` and collapses
/// dash runs.
#[must_use]
pub fn slugify_media_name(original: &str) -> String {
    let lowered = file_basename(original).to_lowercase();
    let replaced = MEDIA_UNSAFE_CHARS.replace_all(&lowered, "-");
    DASH_RUNS.replace_all(&replaced, "-").into_owned()
}
