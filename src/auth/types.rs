//! Auth configuration types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Location for API key placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Place in HTTP header
    #[default]
    Header,
    /// Place in query parameter
    Query,
}

/// Authentication configuration
///
/// Only applied to requests that are flagged as needing auth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication configured
    #[default]
    None,

    /// Bearer token, possibly supplied later through `update_token`
    Bearer {
        /// Initial token
        #[serde(default)]
        token: Option<String>,
    },

    /// API Key authentication (header or query)
    ApiKey {
        /// Where to place the API key
        #[serde(default)]
        location: Location,
        /// Header name (for header location)
        #[serde(default)]
        header_name: Option<String>,
        /// Query parameter name (for query location)
        #[serde(default)]
        query_param: Option<String>,
        /// Prefix to add before the value
        #[serde(default)]
        prefix: Option<String>,
        /// The API key value
        value: String,
    },

    /// HTTP Basic authentication
    Basic {
        username: String,
        password: String,
    },

    /// Fixed headers added to each authenticated request
    #[serde(rename = "headers")]
    CustomHeaders { headers: BTreeMap<String, String> },
}

impl AuthConfig {
    /// Whether any credentials are configured
    pub fn is_none(&self) -> bool {
        matches!(self, AuthConfig::None)
    }
}

/// Cached token with expiration
#[derive(Debug, Clone, PartialEq)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Create a token that expires in N seconds from now
    pub fn expires_in(token: impl Into<String>, seconds: i64) -> Self {
        let expires_at = Utc::now() + chrono::Duration::seconds(seconds);
        Self::new(token, Some(expires_at))
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check expiry against a fixed clock
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + chrono::Duration::seconds(30) >= expires_at,
            None => false,
        }
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_cached_token_not_expired() {
        let token = CachedToken::expires_in("test", 3600);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_cached_token_expired() {
        let token = CachedToken::expires_in("test", -100);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_inside_buffer() {
        let token = CachedToken::expires_in("test", 10);
        assert!(token.is_expired());
    }

    #[test]
    fn test_cached_token_no_expiration() {
        let token = CachedToken::new("test", None);
        assert!(!token.is_expired());
    }

    #[test]
    fn test_auth_config_default() {
        let config = AuthConfig::default();
        assert!(config.is_none());
    }

    #[test]
    fn test_auth_config_yaml() {
        let config: AuthConfig = serde_yaml::from_str(
            "type: api_key\nlocation: query\nquery_param: key\nvalue: abc\n",
        )
        .unwrap();
        assert_eq!(
            config,
            AuthConfig::ApiKey {
                location: Location::Query,
                header_name: None,
                query_param: Some("key".to_string()),
                prefix: None,
                value: "abc".to_string(),
            }
        );

        let config: AuthConfig = serde_yaml::from_str("type: bearer\n").unwrap();
        assert_eq!(config, AuthConfig::Bearer { token: None });

        let config: AuthConfig =
            serde_yaml::from_str("type: headers\nheaders:\n  X-Client: pager\n").unwrap();
        assert!(matches!(config, AuthConfig::CustomHeaders { headers } if headers.len() == 1));
    }
}
