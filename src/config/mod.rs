//! Client configuration module
//!
//! Loads the YAML client configuration (`base_url`, `http`, `auth`, `cache`,
//! `pagination`) and converts it into runtime settings.

mod loader;
mod types;

pub use loader::{load_config, load_config_from_str};
pub use types::{BackoffConfig, CacheConfig, ClientConfig, HttpConfig, PaginationConfig};
