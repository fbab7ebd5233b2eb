//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use std::collections::HashSet;

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `cache_version` is empty or contains whitespace
    /// - a `precache` entry is empty, unresolvable, or resolves to a duplicate URL
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scope = self.scope_url()?;

        if self.cache_version.is_empty() || self.cache_version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "cache_version".into(),
                reason: "must be non-empty and contain no whitespace".into(),
            });
        }

        if self.precache.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid { field: "precache".into(), reason: "entries must not be empty".into() });
        }
        let mut seen = HashSet::new();
        for url in self.precache_urls()? {
            if url.origin() != scope.origin() {
                return Err(ConfigError::Invalid {
                    field: "precache".into(),
                    reason: format!("{url} is outside the application origin"),
                });
            }
            if !seen.insert(url.to_string()) {
                return Err(ConfigError::Invalid { field: "precache".into(), reason: format!("duplicate entry {url}") });
            }
        }

        self.fallback_document_url()?;

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.precache.is_empty() {
            tracing::warn!("precache manifest is empty; offline navigation will rely on the dynamic partition only");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_origin() {
        let config = AppConfig { origin: "not a url".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("origin"));
    }

    #[test]
    fn test_validate_cache_version() {
        let config = AppConfig { cache_version: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("cache_version"));

        let config = AppConfig { cache_version: "v 2".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("cache_version"));
    }

    #[test]
    fn test_validate_duplicate_precache() {
        let config = AppConfig { precache: vec!["./index.html".into(), "index.html".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("precache"));
    }

    #[test]
    fn test_validate_cross_origin_precache() {
        let config = AppConfig { precache: vec!["https://cdn.test/lib.js".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("precache"));
    }

    #[test]
    fn test_validate_empty_precache_entry() {
        let config = AppConfig { precache: vec!["  ".into()], ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("precache"));
    }

    #[test]
    fn test_validate_empty_precache_allowed() {
        let config = AppConfig { precache: Vec::new(), ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_max_bytes() {
        let config = AppConfig { max_bytes: 0, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("max_bytes"));

        let config = AppConfig { max_bytes: 51 * 1024 * 1024, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("max_bytes"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig { max_bytes: 1, timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());

        let config = AppConfig { max_bytes: 50 * 1024 * 1024, timeout_ms: 300_000, ..Default::default() };
        assert!(config.validate().is_ok());
    }
}
