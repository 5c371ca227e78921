// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # jsonapi-pager
//!
//! Client core for paginated JSON:API collections: request templates, link
//! based navigation, typed parsing with `included` resolution and a record
//! cache with TTL eviction.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jsonapi_pager::{
//!     Database, HttpClient, HttpClientConfig, HttpTransport, PaginatedService, Parser,
//!     RequestTemplate, TypeRegistry,
//! };
//! use std::sync::Arc;
//!
//! let client = HttpClient::with_config(
//!     HttpClientConfig::builder().base_url("https://kitsu.io/api/edge").build(),
//! )?;
//! let template = RequestTemplate::builder("/anime")
//!     .filter("text", "cowboy")
//!     .include("genres")
//!     .page(0, 20)
//!     .build();
//! let parser = Parser::new(TypeRegistry::passthrough(["anime", "genres"]), Database::new());
//!
//! let service = PaginatedService::new(
//!     template,
//!     Arc::new(HttpTransport::new(client)),
//!     parser,
//!     |result, is_original| match result {
//!         Ok(page) => println!("{} records (original: {is_original})", page.len()),
//!         Err(e) if e.is_pagination() => {}
//!         Err(e) => eprintln!("{e}"),
//!     },
//! );
//! service.start();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       PaginatedService                          │
//! │  start()  next()  prev()  first()  last()  cancel()             │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────┬──────────────┬───┴──────────┬────────────┬──────────┐
//! │  Request  │  Transport   │  Pagination  │   Parser   │  Store   │
//! ├───────────┼──────────────┼──────────────┼────────────┼──────────┤
//! │ Template  │ HTTP + Retry │ LinkState    │ Registry   │ Database │
//! │ Builder   │ Rate Limit   │ Directions   │ Included   │ Sweep    │
//! │ Follow    │ Auth         │              │ first      │ Snapshot │
//! └───────────┴──────────────┴──────────────┴────────────┴──────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types used throughout the crate
pub mod types;

/// Authentication
pub mod auth;

/// HTTP client and transport
pub mod http;

/// Request templates and outbound requests
pub mod request;

/// Link-based pagination
pub mod pagination;

/// JSON:API document parsing
pub mod parser;

/// Record store and cache eviction
pub mod store;

/// Paginated service
pub mod service;

/// Client configuration
pub mod config;

/// CLI
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use auth::{AuthConfig, Authenticator, CachedToken};
pub use config::{load_config, load_config_from_str, ClientConfig};
pub use http::{HttpClient, HttpClientConfig, HttpTransport, Transport};
pub use pagination::{LinkState, PageDirection};
pub use parser::{ParseContext, ParsedDocument, Parser, Resource, ResourceIdentifier, TypeRegistry};
pub use request::{Request, RequestTemplate, RequestTemplateBuilder, SortField};
pub use service::{Completion, Page, PaginatedService};
pub use store::{CacheSweeper, Database, Record, RecordKey, SweepReport};
