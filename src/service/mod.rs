//! Paginated service module
//!
//! Drives one request template through fetch, parse and commit cycles and
//! keeps the pagination cursors of the last successful page.
//!
//! # Overview
//!
//! - `PaginatedService` - `start`, cursor navigation and `cancel`
//! - `Page` - Records and cursors delivered to the completion callback
//! - `Completion` - The callback type
//!
//! Navigation before the first successful `start` behaves like `start`.
//! Missing cursors are reported with `Error::NoNextPage` and friends
//! without touching the network.

mod paginated;
mod types;

pub use paginated::PaginatedService;
pub use types::{Completion, Page};
