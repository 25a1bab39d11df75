//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SWCACHE_*)
//! 2. TOML config file (if SWCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::registry::DEFAULT_SHELL_ASSETS;
use crate::{CacheGeneration, Error, RequestClassifier, ShellAssetRegistry, StoreRole};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SWCACHE_*)
/// 2. TOML config file (if SWCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding every cache store.
    ///
    /// Set via SWCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Prefix shared by all store names.
    ///
    /// Set via SWCACHE_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag of the shell store. Bump on every deploy.
    ///
    /// Set via SWCACHE_SHELL_VERSION environment variable.
    #[serde(default = "default_shell_version")]
    pub shell_version: String,

    /// Version tag of the API store.
    ///
    /// Set via SWCACHE_API_VERSION environment variable.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Origin the page itself is served from; same-origin shell paths resolve against it.
    ///
    /// Set via SWCACHE_SITE_ORIGIN environment variable.
    #[serde(default = "default_site_origin")]
    pub site_origin: String,

    /// Origin of the REST API whose reads and writes are intercepted.
    ///
    /// Set via SWCACHE_API_ORIGIN environment variable.
    #[serde(default = "default_api_origin")]
    pub api_origin: String,

    /// Collection-listing endpoints on the API origin.
    ///
    /// Reads of these paths get the offline empty-list fallback; writes under
    /// them invalidate the listing.
    #[serde(default = "default_collection_paths")]
    pub collection_paths: Vec<String>,

    /// Application shell entries (root-relative paths or absolute URLs).
    #[serde(default = "default_shell_assets")]
    pub shell_assets: Vec<String>,

    /// Header set on synthesized offline listings.
    ///
    /// Set via SWCACHE_OFFLINE_HEADER environment variable.
    #[serde(default = "default_offline_header")]
    pub offline_header: String,

    /// User-Agent string for outgoing requests.
    ///
    /// Set via SWCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network timeout in milliseconds.
    ///
    /// Set via SWCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./swcache.sqlite")
}

fn default_cache_prefix() -> String {
    "story-spa".into()
}

fn default_shell_version() -> String {
    "v3".into()
}

fn default_api_version() -> String {
    "v2".into()
}

fn default_site_origin() -> String {
    "http://localhost:3000".into()
}

fn default_api_origin() -> String {
    "https://story-api.dicoding.dev".into()
}

fn default_collection_paths() -> Vec<String> {
    vec!["/v1/stories".into()]
}

fn default_shell_assets() -> Vec<String> {
    DEFAULT_SHELL_ASSETS.iter().map(|s| s.to_string()).collect()
}

fn default_offline_header() -> String {
    "X-Offline".into()
}

fn default_user_agent() -> String {
    "swcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            cache_prefix: default_cache_prefix(),
            shell_version: default_shell_version(),
            api_version: default_api_version(),
            site_origin: default_site_origin(),
            api_origin: default_api_origin(),
            collection_paths: default_collection_paths(),
            shell_assets: default_shell_assets(),
            offline_header: default_offline_header(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Current shell store generation.
    pub fn shell_generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.cache_prefix, StoreRole::Shell, &self.shell_version)
    }

    /// Current API store generation.
    pub fn api_generation(&self) -> CacheGeneration {
        CacheGeneration::new(&self.cache_prefix, StoreRole::Api, &self.api_version)
    }

    pub fn shell_registry(&self) -> Result<ShellAssetRegistry, Error> {
        ShellAssetRegistry::new(&self.site_origin, &self.shell_assets)
    }

    pub fn classifier(&self) -> Result<RequestClassifier, Error> {
        RequestClassifier::new(&self.api_origin, self.shell_registry()?)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SWCACHE_`
    /// 2. TOML file from `SWCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SWCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SWCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
