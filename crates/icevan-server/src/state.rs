//! Shared handler state

use crate::config::{ConfigError, ServerConfig};
use crate::error::{ApiError, Failure};
use icevan_assets::{Catalog, LocalFsBackend, PositionalStore, VideoLibrary};

/// Services every handler can reach
#[derive(Clone)]
pub struct AppState {
    pub store: PositionalStore,
    pub catalog: Catalog,
    pub videos: VideoLibrary,
    expose_error_details: bool,
}

impl AppState {
    /// Wire the store, catalog and video library over `public_dir`
    ///
    /// # Errors
    /// Returns `ConfigError::Registry` for an invalid vehicle slug.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let store = PositionalStore::new(LocalFsBackend::new(&config.public_dir), config.registry()?)
            .with_config(config.store_config());
        Ok(Self {
            catalog: Catalog::new(store.clone()),
            videos: VideoLibrary::new(store.clone()),
            store,
            expose_error_details: config.expose_error_details,
        })
    }

    /// Turn an error into its HTTP response
    pub fn fail(&self, error: impl Into<ApiError>) -> Failure {
        Failure {
            error: error.into(),
            expose_details: self.expose_error_details,
        }
    }
}
