//! Configuration loading and settings resolution
//!
//! Server settings resolve in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Tiers 1 and 2 arrive together as [`ServerOverrides`] (clap reads both);
//! this module merges them with the file and the defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Listen port when nothing else is configured
pub const DEFAULT_PORT: u16 = 5000;

/// Aggregate memo lifetime in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

/// Largest `limit` a listing request may ask for
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 1000;

/// Hard ceiling for the configurable `max_page_size`
pub const MAX_PAGE_SIZE_CEILING: i64 = 1000;

/// Optional on-disk configuration (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub cache_ttl_secs: Option<u64>,
    pub max_page_size: Option<i64>,
}

impl TomlConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Self::parse(&content)
    }
}

/// Platform config file location (`~/.config/insight/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("insight").join("config.toml"))
}

/// Platform default store location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("insight").join("insight.db"))
        .unwrap_or_else(|| PathBuf::from("./insight_data/insight.db"))
}

/// Load the TOML tier
///
/// An explicitly named file must exist. The platform default file is
/// optional: when it is missing the tier is simply empty.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<TomlConfig> {
    if let Some(path) = explicit {
        info!("Loading config file {}", path.display());
        return TomlConfig::load(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            info!("Loading config file {}", path.display());
            TomlConfig::load(&path)
        }
        Some(path) => {
            debug!("No config file at {}, using defaults", path.display());
            Ok(TomlConfig::default())
        }
        None => Ok(TomlConfig::default()),
    }
}

/// Allowed-origin policy for cross-origin requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Any origin (permissive)
    Any,
    /// Only the listed origins
    Only(Vec<String>),
}

impl OriginPolicy {
    /// An empty list or a `*` entry means permissive
    pub fn from_list<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Vec::new();
        for origin in origins {
            let origin = origin.as_ref().trim();
            if origin == "*" {
                return OriginPolicy::Any;
            }
            if !origin.is_empty() {
                list.push(origin.to_string());
            }
        }

        if list.is_empty() {
            OriginPolicy::Any
        } else {
            OriginPolicy::Only(list)
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    pub database_path: Option<PathBuf>,
    pub port: Option<u16>,
    pub allowed_origins: Option<Vec<String>>,
    pub cache_ttl_secs: Option<u64>,
    pub max_page_size: Option<i64>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub database_path: PathBuf,
    pub port: u16,
    pub origins: OriginPolicy,
    pub cache_ttl: Duration,
    pub max_page_size: i64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: DEFAULT_PORT,
            origins: OriginPolicy::Any,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl ServerSettings {
    /// Merge overrides over the file over the defaults, then validate
    pub fn resolve(overrides: ServerOverrides, file: TomlConfig) -> Result<Self> {
        let database_path = overrides
            .database_path
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let port = overrides.port.or(file.port).unwrap_or(DEFAULT_PORT);

        let origins = overrides
            .allowed_origins
            .or(file.allowed_origins)
            .map(OriginPolicy::from_list)
            .unwrap_or(OriginPolicy::Any);

        let cache_ttl_secs = overrides
            .cache_ttl_secs
            .or(file.cache_ttl_secs)
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);

        let max_page_size = overrides
            .max_page_size
            .or(file.max_page_size)
            .unwrap_or(DEFAULT_MAX_PAGE_SIZE);

        if !(1..=MAX_PAGE_SIZE_CEILING).contains(&max_page_size) {
            return Err(Error::Config(format!(
                "max_page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE_CEILING, max_page_size
            )));
        }

        Ok(Self {
            database_path,
            port,
            origins,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            max_page_size,
        })
    }
}
