//! Transport seam between the paginated service and the network

use super::client::HttpClient;
use crate::error::{Error, Result};
use crate::request::Request;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Executes a request and yields the decoded JSON document
///
/// Implementations own retries, auth and rate limiting; callers see a single
/// result per request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &Request) -> Result<Value>;
}

/// `Transport` over the retrying HTTP client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Arc<HttpClient>,
}

impl HttpTransport {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Share an existing client
    pub fn from_shared(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<Value> {
        let response = self.client.execute(request).await?;
        let body = response.text().await?;
        debug!("Received {} byte(s) from {}", body.len(), request.url);

        serde_json::from_str(&body)
            .map_err(|e| Error::invalid_json(format!("response from {}: {e}", request.url)))
    }
}
