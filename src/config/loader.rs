//! YAML loader for client configuration
//!
//! Parses, validates and converts the configuration into the runtime types
//! of the HTTP, auth and cache layers.

use super::types::ClientConfig;
use crate::auth::AuthConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::OptionStringExt;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Load a client configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;
    debug!("Loaded config from {}", path.display());
    load_config_from_str(&content)
}

/// Load a client configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<ClientConfig> {
    let config: ClientConfig = serde_yaml::from_str(yaml)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate a client configuration
fn validate_config(config: &ClientConfig) -> Result<()> {
    if config.base_url.trim().is_empty() {
        return Err(Error::missing_field("base_url"));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::invalid_value(
            "base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if config.http.timeout_secs == 0 {
        return Err(Error::invalid_value("http.timeout_secs", "must be positive"));
    }

    if config.http.backoff.initial_ms > config.http.backoff.max_ms {
        return Err(Error::invalid_value(
            "http.backoff",
            "initial_ms cannot exceed max_ms",
        ));
    }

    if let Some(rate_limit) = &config.http.rate_limit {
        if rate_limit.requests_per_second == 0 {
            return Err(Error::invalid_value(
                "http.rate_limit.requests_per_second",
                "must be positive",
            ));
        }
    }

    validate_auth(&config.auth)?;

    if config.cache.ttl_secs == 0 {
        return Err(Error::invalid_value("cache.ttl_secs", "must be positive"));
    }

    if config.cache.sweep_interval_secs == Some(0) {
        return Err(Error::invalid_value(
            "cache.sweep_interval_secs",
            "must be positive",
        ));
    }

    if config.pagination.default_limit == 0 {
        return Err(Error::invalid_value(
            "pagination.default_limit",
            "must be positive",
        ));
    }

    Ok(())
}

/// Validate credentials
fn validate_auth(auth: &AuthConfig) -> Result<()> {
    match auth {
        AuthConfig::ApiKey { value, .. } if value.is_empty() => {
            Err(Error::missing_field("auth.value"))
        }
        AuthConfig::Basic { username, .. } if username.is_empty() => {
            Err(Error::missing_field("auth.username"))
        }
        AuthConfig::CustomHeaders { headers } if headers.is_empty() => {
            Err(Error::missing_field("auth.headers"))
        }
        _ => Ok(()),
    }
}

impl ClientConfig {
    /// Check the configuration the way the YAML loaders do
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }

    /// Runtime HTTP client configuration
    pub fn http_client_config(&self) -> HttpClientConfig {
        let http = &self.http;
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .timeout(Duration::from_secs(http.timeout_secs))
            .max_retries(http.max_retries)
            .backoff(
                http.backoff.backoff_type,
                Duration::from_millis(http.backoff.initial_ms),
                Duration::from_millis(http.backoff.max_ms),
            );

        builder = match &http.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit.clone()),
            None => builder.no_rate_limit(),
        };

        if let Some(agent) = http.user_agent.clone().none_if_empty() {
            builder = builder.user_agent(agent);
        }

        for (key, value) in &http.headers {
            builder = builder.header(key, value);
        }

        builder.build()
    }

    /// Build an HTTP client with the configured credentials
    pub fn build_client(&self) -> Result<HttpClient> {
        HttpClient::with_auth(self.http_client_config(), self.auth.clone())
    }

    /// Age after which cached records may be swept
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    /// Period of the background sweeper, if enabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.cache.sweep_interval_secs.map(Duration::from_secs)
    }
}
