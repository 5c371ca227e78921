//! Pagination module
//!
//! Link-based pagination as returned by JSON:API servers.
//!
//! # Overview
//!
//! Servers describe neighbouring pages with absolute URLs in the top-level
//! `links` object. `LinkState` captures those four cursors from one response,
//! and `PageDirection` names which cursor a caller wants to follow.

mod types;

pub use types::{LinkState, PageDirection};
