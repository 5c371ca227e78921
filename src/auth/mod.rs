//! Authentication module
//!
//! Supports: Bearer, API Key, Basic, Custom Headers
//!
//! The `Authenticator` is only consulted for requests that need auth. A
//! bearer token is cached and can be swapped with `update_token` after it
//! has been refreshed elsewhere.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, Location};
