//! Request module
//!
//! Request templates and executable requests.
//!
//! # Overview
//!
//! The request module provides:
//! - `RequestTemplate` - Immutable description of a JSON:API list request
//!   (path, filters, includes, sort, page, auth requirement)
//! - `RequestTemplateBuilder` - Builder whose `build()` snapshots its state
//! - `Request` - One concrete request handed to a transport, either rendered
//!   from a template or followed verbatim from a pagination cursor

mod outbound;
mod template;

pub use outbound::Request;
pub use template::{PageSpec, RequestTemplate, RequestTemplateBuilder, SortDirection, SortField};
