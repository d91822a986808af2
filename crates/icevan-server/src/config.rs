//! Server configuration
//!
//! Resolved in layers: built-in defaults, an optional TOML file, `ICEVAN_*`
//! environment variables, then command-line flags (applied by the binary).

use icevan_assets::{AssetError, FolderRegistry, NextPositionPolicy, StoreConfig, DEFAULT_VEHICLE_SLUGS};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "ICEVAN_CONFIG";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    Registry(#[from] AssetError),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}', expected text or json")),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            filter: "info,tower_http=info".to_string(),
        }
    }
}

/// Full server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Public root that asset folders live under and static files are served from
    pub public_dir: PathBuf,
    /// Registered vehicle slugs, one gallery folder each
    pub vehicles: Vec<String>,
    pub next_position: NextPositionPolicy,
    pub serialize_folder_writes: bool,
    /// Attach the underlying error text to error responses
    pub expose_error_details: bool,
    pub max_upload_bytes: usize,
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            public_dir: PathBuf::from("public"),
            vehicles: DEFAULT_VEHICLE_SLUGS.iter().map(|s| (*s).to_string()).collect(),
            next_position: NextPositionPolicy::Count,
            serialize_folder_writes: true,
            expose_error_details: false,
            max_upload_bytes: 25 * 1024 * 1024,
            logging: LoggingConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed TOML or unknown keys.
    pub fn from_toml_str(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns `ConfigError::Read` or `ConfigError::Parse`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source, path)
    }

    /// Defaults, then the file (explicit path or `ICEVAN_CONFIG`), then env
    ///
    /// # Errors
    /// Any file or environment value error.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `ICEVAN_*` overrides read through `lookup`
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` for unparsable values.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("ICEVAN_BIND") {
            self.bind = parse_value("ICEVAN_BIND", &value)?;
        }
        if let Some(value) = lookup("ICEVAN_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("ICEVAN_VEHICLES") {
            self.vehicles = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = lookup("ICEVAN_NEXT_POSITION") {
            self.next_position = parse_policy(&value)?;
        }
        if let Some(value) = lookup("ICEVAN_SERIALIZE_FOLDER_WRITES") {
            self.serialize_folder_writes = parse_value("ICEVAN_SERIALIZE_FOLDER_WRITES", &value)?;
        }
        if let Some(value) = lookup("ICEVAN_EXPOSE_ERROR_DETAILS") {
            self.expose_error_details = parse_value("ICEVAN_EXPOSE_ERROR_DETAILS", &value)?;
        }
        if let Some(value) = lookup("ICEVAN_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_value("ICEVAN_MAX_UPLOAD_BYTES", &value)?;
        }
        if let Some(value) = lookup("ICEVAN_LOG_FORMAT") {
            self.logging.format = parse_value("ICEVAN_LOG_FORMAT", &value)?;
        }
        if let Some(value) = lookup("ICEVAN_LOG_FILTER") {
            self.logging.filter = value;
        }
        Ok(())
    }

    /// Store knobs derived from this config
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new()
            .with_next_position(self.next_position)
            .with_serialized_writes(self.serialize_folder_writes)
    }

    /// Folder allow-list for the configured vehicles
    ///
    /// # Errors
    /// Returns `ConfigError::Registry` wrapping `InvalidSlug`.
    pub fn registry(&self) -> Result<FolderRegistry, ConfigError> {
        Ok(FolderRegistry::new(&self.vehicles)?)
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_policy(value: &str) -> Result<NextPositionPolicy, ConfigError> {
    match value.trim() {
        "count" => Ok(NextPositionPolicy::Count),
        "max-prefix" => Ok(NextPositionPolicy::MaxPrefix),
        _ => Err(ConfigError::InvalidValue {
            key: "ICEVAN_NEXT_POSITION",
            value: value.to_string(),
        }),
    }
}
