//! Configuration types for Agency Directory
//!
//! Configuration is layered: serde defaults, then an optional YAML file, then
//! `AGENCY_`-prefixed environment variables using `__` between nested keys
//! (`AGENCY_SERVER__PORT=8080`, `AGENCY_STORE__BACKEND=firestore`).
//!
//! Page size and cache TTL are fixed and deliberately absent here.

use crate::{DirectoryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "AGENCY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Document store settings
    #[serde(default)]
    pub store: StoreSettings,
    /// Cache sizing
    #[serde(default)]
    pub cache: CacheSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            max_request_size: default_max_request_size(),
        }
    }
}

/// Which document store backs the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process store, optionally seeded from a JSON file
    #[default]
    Memory,
    /// Firestore over its REST API
    Firestore,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Firestore => write!(f, "firestore"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            _ => Err(DirectoryError::validation(format!(
                "Invalid store backend: {}",
                s
            ))),
        }
    }
}

/// Document store settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    /// JSON seed file for the memory backend
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    #[serde(default)]
    pub firestore: FirestoreSettings,
}

/// Firestore REST connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_firestore_url")]
    pub base_url: String,
    /// Sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,
    /// Sent as a bearer token
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database: default_database(),
            collection: default_collection(),
            base_url: default_firestore_url(),
            api_key: None,
            auth_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Cache sizing; entries still expire after the fixed TTL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Maximum entries held by each of the count and response caches
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: default_cache_capacity(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Prefix pretty output with timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Include source file and line in each event
    #[serde(default)]
    pub file_info: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            timestamps: true,
            file_info: false,
        }
    }
}

impl DirectoryConfig {
    /// Loads configuration from an optional YAML file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(DirectoryError::validation(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Yaml),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: DirectoryConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Loads configuration from a YAML file only
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(DirectoryError::validation("Server port cannot be 0"));
        }

        if self.cache.max_capacity == 0 {
            return Err(DirectoryError::validation(
                "Cache capacity must be greater than 0",
            ));
        }

        if self.store.backend == StoreBackend::Firestore {
            let firestore = &self.store.firestore;
            if firestore.project_id.trim().is_empty() {
                return Err(DirectoryError::validation(
                    "Firestore backend requires store.firestore.project_id",
                ));
            }
            let url = Url::parse(&firestore.base_url)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(DirectoryError::validation(
                    "Firestore URL must use http or https scheme",
                ));
            }
            if firestore.timeout_secs == 0 {
                return Err(DirectoryError::validation(
                    "Firestore timeout must be greater than 0",
                ));
            }
            if firestore.collection.trim().is_empty() {
                return Err(DirectoryError::validation(
                    "Firestore collection cannot be empty",
                ));
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(DirectoryError::validation(format!(
                "Invalid log level: {}",
                other
            ))),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_request_size() -> usize {
    1024 * 1024
}
fn default_database() -> String {
    "(default)".to_string()
}
fn default_collection() -> String {
    "agencies".to_string()
}
fn default_firestore_url() -> String {
    "https://firestore.googleapis.com".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_cache_capacity() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}
