//! Configuration types
//!
//! Structures deserialized from the client YAML file.

use crate::auth::AuthConfig;
use crate::http::RateLimiterConfig;
use crate::types::{BackoffType, StringMap};
use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL that request paths are relative to
    pub base_url: String,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Credentials for requests that need auth
    #[serde(default)]
    pub auth: AuthConfig,

    /// Record cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Pagination defaults
    #[serde(default)]
    pub pagination: PaginationConfig,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: HttpConfig::default(),
            auth: AuthConfig::default(),
            cache: CacheConfig::default(),
            pagination: PaginationConfig::default(),
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of transport retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Token bucket limit; `null` disables rate limiting
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: StringMap,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
            user_agent: None,
            headers: StringMap::new(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

#[allow(clippy::unnecessary_wraps)]
fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Cache and Pagination
// ============================================================================

/// Record cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Age in seconds after which stamped records may be swept
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Background sweep period; absent means sweep only on demand
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,

    /// Types whose records are stamped and swept
    #[serde(default)]
    pub cacheable: Vec<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            sweep_interval_secs: None,
            cacheable: Vec::new(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

/// Pagination defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// `page[limit]` used when a request does not set one
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

fn default_limit() -> u32 {
    20
}
