//! Authenticator implementation
//!
//! Applies credentials to outgoing requests. The bearer token is held in a
//! shared cache so that it can be replaced while requests are in flight.

use super::types::{AuthConfig, CachedToken, Location};
use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use reqwest::RequestBuilder;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator handles applying authentication to HTTP requests
#[derive(Clone)]
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Current bearer token
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        let initial = match &config {
            AuthConfig::Bearer { token } => token
                .clone()
                .none_if_empty()
                .map(|token| CachedToken::new(token, None)),
            _ => None,
        };
        Self {
            config,
            cached_token: Arc::new(RwLock::new(initial)),
        }
    }

    /// Apply authentication to a request builder
    pub async fn apply(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        match &self.config {
            AuthConfig::None => Err(Error::auth(
                "request requires authentication but no credentials are configured",
            )),

            AuthConfig::Bearer { .. } => {
                let token = self.current_token().await?;
                Ok(req.bearer_auth(token))
            }

            AuthConfig::ApiKey {
                location,
                header_name,
                query_param,
                prefix,
                value,
            } => {
                let val = format!("{}{}", prefix.as_deref().unwrap_or(""), value);
                match location {
                    Location::Header => {
                        let header = header_name.as_deref().unwrap_or("Authorization");
                        Ok(req.header(header, val))
                    }
                    Location::Query => {
                        let param = query_param.as_deref().unwrap_or("api_key");
                        Ok(req.query(&[(param, val)]))
                    }
                }
            }

            AuthConfig::Basic { username, password } => {
                Ok(req.basic_auth(username, Some(password)))
            }

            AuthConfig::CustomHeaders { headers } => {
                let mut req = req;
                for (key, value) in headers {
                    req = req.header(key.as_str(), value.as_str());
                }
                Ok(req)
            }
        }
    }

    /// Current bearer token; missing or expired tokens are auth errors
    async fn current_token(&self) -> Result<String> {
        let cached = self.cached_token.read().await;
        match cached.as_ref() {
            Some(token) if !token.is_expired() => Ok(token.token.clone()),
            Some(_) => Err(Error::auth("bearer token has expired")),
            None => Err(Error::auth("no bearer token available")),
        }
    }

    /// Replace the bearer token
    pub async fn update_token(&self, token: CachedToken) {
        debug!("Bearer token updated (expires at {:?})", token.expires_at);
        *self.cached_token.write().await = Some(token);
    }

    /// Forget the bearer token
    pub async fn clear_token(&self) {
        *self.cached_token.write().await = None;
    }

    /// Snapshot of the current bearer token
    pub async fn token(&self) -> Option<CachedToken> {
        self.cached_token.read().await.clone()
    }

    /// Get the auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.config {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::ApiKey { .. } => "api_key",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::CustomHeaders { .. } => "headers",
        };
        f.debug_struct("Authenticator")
            .field("kind", &kind)
            .finish_non_exhaustive()
    }
}
