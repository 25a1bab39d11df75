//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn validate_origin(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| invalid(field, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, "must use http or https"));
    }
    if url.path() != "/" || url.query().is_some() {
        return Err(invalid(field, "must be an origin without path or query"));
    }
    Ok(())
}

fn validate_tag(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(invalid(field, "must not contain whitespace"));
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `site_origin` or `api_origin` is not a bare http(s) origin
    /// - `cache_prefix`, `shell_version` or `api_version` is empty or contains whitespace
    /// - a collection path is not root-relative
    /// - a shell asset is neither root-relative nor an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `offline_header` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_origin("site_origin", &self.site_origin)?;
        validate_origin("api_origin", &self.api_origin)?;

        validate_tag("cache_prefix", &self.cache_prefix)?;
        validate_tag("shell_version", &self.shell_version)?;
        validate_tag("api_version", &self.api_version)?;

        for path in &self.collection_paths {
            if !path.starts_with('/') || path.contains('?') {
                return Err(invalid("collection_paths", format!("{path:?} must be a root-relative path")));
            }
        }

        for asset in &self.shell_assets {
            if asset.starts_with('/') {
                continue;
            }
            match Url::parse(asset) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                _ => {
                    return Err(invalid(
                        "shell_assets",
                        format!("{asset:?} must be root-relative or an absolute http(s) URL"),
                    ));
                }
            }
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.offline_header.is_empty() {
            return Err(invalid("offline_header", "must not be empty"));
        }

        if self.shell_assets.is_empty() {
            tracing::warn!("shell_assets is empty; nothing will be available offline before first use");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_api_origin_with_path() {
        let config = AppConfig { api_origin: "https://story-api.dicoding.dev/v1".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_origin"));
    }

    #[test]
    fn test_validate_site_origin_scheme() {
        let config = AppConfig { site_origin: "ftp://localhost".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "site_origin"));
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AppConfig { shell_version: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "shell_version"));
    }

    #[test]
    fn test_validate_version_whitespace() {
        let config = AppConfig { api_version: "v 2".into(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "api_version"));
    }

    #[test]
    fn test_validate_relative_collection_path() {
        let config = AppConfig { collection_paths: vec!["v1/stories".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "collection_paths"));
    }

    #[test]
    fn test_validate_bad_shell_asset() {
        let config = AppConfig { shell_assets: vec!["bundle.js".into()], ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "shell_assets"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
