//! Service types

use crate::error::Result;
use crate::pagination::LinkState;
use crate::parser::ParsedDocument;
use std::sync::Arc;

/// One delivered page
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    /// Included records first, then primary data
    pub records: Vec<R>,
    /// How many leading records came from `included`
    pub included_count: usize,
    /// Cursors carried by the response
    pub links: LinkState,
    /// Malformed objects dropped while parsing
    pub dropped: usize,
    /// Objects of unregistered types
    pub skipped: usize,
}

impl<R> Page<R> {
    pub(crate) fn new(parsed: ParsedDocument<R>, links: LinkState) -> Self {
        Self {
            records: parsed.records,
            included_count: parsed.included_count,
            links,
            dropped: parsed.dropped,
            skipped: parsed.skipped,
        }
    }

    /// Records from the `data` section
    pub fn primary(&self) -> &[R] {
        &self.records[self.included_count..]
    }

    /// Records from the `included` section
    pub fn included(&self) -> &[R] {
        &self.records[..self.included_count]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Receives the outcome of every cycle.
///
/// The flag is `true` for original (`start`) cycles and `false` for cursor
/// navigation.
pub type Completion<R> = Arc<dyn Fn(Result<Page<R>>, bool) + Send + Sync>;
