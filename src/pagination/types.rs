//! Pagination types
//!
//! Defines the link cursors and the directions that follow them.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Which neighbouring page to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    First,
    Next,
    Previous,
    Last,
}

impl PageDirection {
    /// The local error raised when this cursor is absent
    pub fn missing_error(self) -> Error {
        match self {
            Self::First => Error::NoFirstPage,
            Self::Next => Error::NoNextPage,
            Self::Previous => Error::NoPreviousPage,
            Self::Last => Error::NoLastPage,
        }
    }

    /// Key of this cursor in a JSON:API `links` object
    pub fn link_key(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Next => "next",
            Self::Previous => "prev",
            Self::Last => "last",
        }
    }
}

impl fmt::Display for PageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.link_key())
    }
}

/// The four pagination cursors of the last successful response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkState {
    pub first: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub last: Option<String>,
}

impl LinkState {
    /// Create an empty link state
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract cursors from a response document.
    ///
    /// Every cursor is taken from this document alone. A missing or
    /// non-object `links` block yields an empty state, never the previous one.
    pub fn from_document(document: &Value) -> Self {
        let Some(links) = document.get("links").and_then(Value::as_object) else {
            return Self::new();
        };

        let cursor = |direction: PageDirection| {
            links
                .get(direction.link_key())
                .and_then(link_href)
                .filter(|href| !href.is_empty())
                .map(ToString::to_string)
        };

        Self {
            first: cursor(PageDirection::First),
            next: cursor(PageDirection::Next),
            previous: cursor(PageDirection::Previous),
            last: cursor(PageDirection::Last),
        }
    }

    /// True iff at least one cursor is present
    pub fn has_any_links(&self) -> bool {
        self.first.is_some() || self.next.is_some() || self.previous.is_some() || self.last.is_some()
    }

    /// Cursor URL for a direction
    pub fn get(&self, direction: PageDirection) -> Option<&str> {
        match direction {
            PageDirection::First => self.first.as_deref(),
            PageDirection::Next => self.next.as_deref(),
            PageDirection::Previous => self.previous.as_deref(),
            PageDirection::Last => self.last.as_deref(),
        }
    }
}

/// A JSON:API link is either a URL string or an object with an `href`
fn link_href(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Object(obj) => obj.get("href").and_then(Value::as_str),
        _ => None,
    }
}
