//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PWA_PROXY_*)
//! 2. TOML config file (if PWA_PROXY_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::PartitionNames;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PWA_PROXY_*)
/// 2. TOML config file (if PWA_PROXY_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Scope URL of the application. Its origin decides which requests are
    /// intercepted, and manifest paths are resolved against it.
    ///
    /// Set via PWA_PROXY_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version tag used to name the static and dynamic partitions.
    ///
    /// Set via PWA_PROXY_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Asset manifest pre-cached at install, relative to `origin`.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Document served from the static partition when a navigation fails offline.
    #[serde(default = "default_fallback_document")]
    pub fallback_document: String,

    /// Path to SQLite partition database.
    ///
    /// Set via PWA_PROXY_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body bytes accepted from the network.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network timeout in milliseconds; governs offline detection.
    ///
    /// Set via PWA_PROXY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_cache_version() -> String {
    "simple-app-v1".into()
}

fn default_precache() -> Vec<String> {
    [
        "./",
        "./index.html",
        "./page2.html",
        "./styles.css",
        "./script.js",
        "./manifest.json",
        "./icons/icon-192x192.png",
        "./icons/icon-512x512.png",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_fallback_document() -> String {
    "./index.html".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./pwa-proxy-cache.sqlite")
}

fn default_user_agent() -> String {
    "pwa-proxy/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_version: default_cache_version(),
            precache: default_precache(),
            fallback_document: default_fallback_document(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Partitions owned by the configured version.
    pub fn partition_names(&self) -> PartitionNames {
        PartitionNames::for_version(&self.cache_version)
    }

    /// Parsed application scope.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute http(s) URL.
    pub fn scope_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme {scheme}") }),
        }
    }

    /// Manifest entries resolved against the scope, in manifest order.
    pub fn precache_urls(&self) -> Result<Vec<Url>, ConfigError> {
        let scope = self.scope_url()?;
        self.precache
            .iter()
            .map(|path| {
                scope
                    .join(path)
                    .map_err(|e| ConfigError::Invalid { field: "precache".into(), reason: format!("{path}: {e}") })
            })
            .collect()
    }

    /// Fallback document resolved against the scope.
    pub fn fallback_document_url(&self) -> Result<Url, ConfigError> {
        self.scope_url()?.join(&self.fallback_document).map_err(|e| ConfigError::Invalid {
            field: "fallback_document".into(),
            reason: e.to_string(),
        })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PWA_PROXY_`
    /// 2. TOML file from `PWA_PROXY_CONFIG_FILE` (if set)
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

        if let Ok(config_path) = std::env::var("PWA_PROXY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PWA_PROXY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
