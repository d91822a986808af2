//! Ice Van Server - admin HTTP surface for the asset store
//!
//! Serves:
//! - `/api/admin/images*`: list, upload, replace, delete and rename images
//! - `/api/admin/videos/upload`: video uploads
//! - `/api/logo`, `/api/hero`, `/api/empresa/imagens`,
//!   `/api/aplicacoes/:slug/imagens`: public read-models
//! - `/health`
//! - everything else as static files from the public root

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod logging;
pub mod multipart;
pub mod routes;
pub mod state;

pub use config::{ConfigError, LogFormat, LoggingConfig, ServerConfig};
pub use error::{ApiError, Failure};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Complete application router for a config
///
/// # Errors
/// Returns `ConfigError::Registry` for an invalid vehicle slug.
pub fn build_router(config: &ServerConfig) -> Result<Router, ConfigError> {
    let state = AppState::from_config(config)?;
    Ok(routes::router()
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
