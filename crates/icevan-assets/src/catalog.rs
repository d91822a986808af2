//! Read-models for the public site
//!
//! Views over the positional folders the public pages render: vehicle
//! galleries, company photos, hero slides and the logo set.

use crate::backend::{AssetBackend, LocalFsBackend};
use crate::error::AssetError;
use crate::folder::{FolderRegistry, COMPANY_FOLDER, HERO_FOLDER, LOGO_FOLDER};
use crate::naming::sort_order;
use crate::store::PositionalStore;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Thumbnail and gallery of one vehicle application
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationGallery {
    pub slug: String,
    /// URL of the asset in the thumbnail slot
    pub thumb: Option<String>,
    pub images: Vec<String>,
}

/// One hero banner with its explicit sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSlide {
    pub filename: String,
    pub url: String,
    pub sort_order: u32,
}

/// Logo variants the layout needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoKind {
    Principal,
    White,
    Favicon,
}

impl LogoKind {
    pub const ALL: [Self; 3] = [Self::Principal, Self::White, Self::Favicon];

    /// URL used when no matching file exists
    #[must_use]
    pub fn fallback(self) -> &'static str {
        match self {
            Self::Principal => "/images/logo/logo.svg",
            Self::White => "/images/logo/logo-white.svg",
            Self::Favicon => "/images/logo/favicon.ico",
        }
    }

    fn matches(self, filename: &str) -> bool {
        static PRINCIPAL: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^logo\.(svg|png|jpg|jpeg|webp|gif)$").expect("static regex")
        });
        static WHITE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^logo-white\.(svg|png|jpg|jpeg|webp|gif)$").expect("static regex")
        });
        static FAVICON: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)^favicon\.(ico|png|jpg|jpeg|svg|webp)$").expect("static regex")
        });

        match self {
            Self::Principal => PRINCIPAL.is_match(filename),
            Self::White => WHITE.is_match(filename),
            Self::Favicon => FAVICON.is_match(filename),
        }
    }
}

/// Resolved logo URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoSet {
    pub principal: String,
    pub branca: String,
    pub favicon: String,
}

impl LogoSet {
    fn fallbacks() -> Self {
        Self::from_names(&[])
    }

    /// Pick each variant from a folder listing, first sorted match wins
    #[must_use]
    pub fn from_names(names: &[String]) -> Self {
        let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let pick = |kind: LogoKind| {
            sorted
                .iter()
                .find(|name| kind.matches(name))
                .map_or_else(
                    || kind.fallback().to_string(),
                    |name| format!("/{LOGO_FOLDER}/{name}"),
                )
        };
        Self {
            principal: pick(LogoKind::Principal),
            branca: pick(LogoKind::White),
            favicon: pick(LogoKind::Favicon),
        }
    }

    /// URL of a variant
    #[must_use]
    pub fn get(&self, kind: LogoKind) -> &str {
        match kind {
            LogoKind::Principal => &self.principal,
            LogoKind::White => &self.branca,
            LogoKind::Favicon => &self.favicon,
        }
    }
}

/// Public read access to the store's folders
pub struct Catalog<B = LocalFsBackend> {
    store: PositionalStore<B>,
}

impl<B> Clone for Catalog<B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<B: AssetBackend> Catalog<B> {
    pub fn new(store: PositionalStore<B>) -> Self {
        Self { store }
    }

    /// Gallery of a registered vehicle; the first asset is the thumbnail
    ///
    /// # Errors
    /// `UnknownApplication` for an unregistered slug, `ReadFailure` if the
    /// listing fails.
    pub async fn application_gallery(&self, slug: &str) -> Result<ApplicationGallery, AssetError> {
        let folder = self.store.registry().application(slug)?;
        let assets = self.store.list_in(&folder).await?;
        let thumb = assets
            .iter()
            .find(|asset| asset.is_thumbnail_slot())
            .map(crate::asset::Asset::url);
        Ok(ApplicationGallery {
            slug: slug.to_string(),
            thumb,
            images: assets.iter().map(crate::asset::Asset::url).collect(),
        })
    }

    /// Company page photo URLs in store order
    ///
    /// # Errors
    /// `ReadFailure` if the listing fails.
    pub async fn company_images(&self) -> Result<Vec<String>, AssetError> {
        let folder = FolderRegistry::fixed(COMPANY_FOLDER);
        let assets = self.store.list_in(&folder).await?;
        Ok(assets.iter().map(crate::asset::Asset::url).collect())
    }

    /// Hero slides ordered by parsed prefix, then filename
    ///
    /// # Errors
    /// `ReadFailure` if the listing fails.
    pub async fn hero_slides(&self) -> Result<Vec<HeroSlide>, AssetError> {
        let folder = FolderRegistry::fixed(HERO_FOLDER);
        let mut slides: Vec<HeroSlide> = self
            .store
            .list_in(&folder)
            .await?
            .into_iter()
            .map(|asset| HeroSlide {
                url: asset.url(),
                sort_order: sort_order(&asset.filename),
                filename: asset.filename,
            })
            .collect();
        slides.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        Ok(slides)
    }

    /// Logo URLs, falling back to the default paths
    ///
    /// Never fails; listing errors are logged and answered with fallbacks.
    pub async fn logos(&self) -> LogoSet {
        let folder = FolderRegistry::fixed(LOGO_FOLDER);
        match self.store.backend().list_names(&folder).await {
            Ok(names) => LogoSet::from_names(&names),
            Err(e) => {
                warn!(folder = %folder, error = %e, "Logo lookup failed, using fallbacks");
                LogoSet::fallbacks()
            }
        }
    }
}
