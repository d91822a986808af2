//! Public read endpoints backing the site pages

use axum::{
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
    Router,
};
use icevan_assets::{HeroSlide, LogoSet};
use serde::Serialize;

use crate::error::Failure;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApplicationImagesResponse {
    pub slug: String,
    pub thumb: Option<String>,
    pub imagens: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageUrlsResponse {
    pub imagens: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HeroResponse {
    pub banners: Vec<HeroSlide>,
}

/// GET /api/logo
pub async fn get_logo(State(state): State<AppState>) -> ResponseJson<LogoSet> {
    ResponseJson(state.catalog.logos().await)
}

/// GET /api/aplicacoes/:slug/imagens
/// Thumbnail and gallery of a registered vehicle
pub async fn get_application_images(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApplicationImagesResponse>, Failure> {
    let gallery = state
        .catalog
        .application_gallery(&slug)
        .await
        .map_err(|e| state.fail(e))?;

    Ok(ResponseJson(ApplicationImagesResponse {
        slug: gallery.slug,
        thumb: gallery.thumb,
        imagens: gallery.images,
    }))
}

/// GET /api/empresa/imagens
pub async fn get_company_images(
    State(state): State<AppState>,
) -> Result<ResponseJson<ImageUrlsResponse>, Failure> {
    let imagens = state
        .catalog
        .company_images()
        .await
        .map_err(|e| state.fail(e))?;
    Ok(ResponseJson(ImageUrlsResponse { imagens }))
}

/// GET /api/hero
/// Slides ordered by their numeric prefix
pub async fn get_hero(State(state): State<AppState>) -> Result<ResponseJson<HeroResponse>, Failure> {
    let banners = state.catalog.hero_slides().await.map_err(|e| state.fail(e))?;
    Ok(ResponseJson(HeroResponse { banners }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/logo", get(get_logo))
        .route("/api/aplicacoes/:slug/imagens", get(get_application_images))
        .route("/api/empresa/imagens", get(get_company_images))
        .route("/api/hero", get(get_hero))
}
