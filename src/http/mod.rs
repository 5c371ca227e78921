//! HTTP client module
//!
//! Provides HTTP client with retry, rate limiting, and backoff strategies,
//! and the `Transport` trait the paginated service talks to.
//!
//! # Features
//!
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff
//! - **Authentication**: Credentials only for requests that need them

mod client;
mod rate_limit;
mod transport;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, JSON_API_MEDIA_TYPE};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
mod tests;
