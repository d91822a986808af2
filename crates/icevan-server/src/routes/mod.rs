use axum::{routing::get, Router};

use crate::state::AppState;

pub mod catalog;
pub mod images;
pub mod media;

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// All API routes, without state or layers
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(images::router())
        .merge(media::router())
        .merge(catalog::router())
}
