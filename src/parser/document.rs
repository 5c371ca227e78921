//! Document parser
//!
//! Parses one JSON:API document in two phases. The `included` section is
//! parsed and committed first, then the `data` section, because data
//! constructors may look up included records by id.

use super::registry::{ParseContext, TypeRegistry};
use super::resource::Resource;
use crate::error::{Error, Result};
use crate::store::{Database, Record};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records parsed from one document
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument<R> {
    /// Included records first, then primary data, each in source order
    pub records: Vec<R>,
    /// How many leading entries of `records` came from `included`
    pub included_count: usize,
    /// Malformed objects that were dropped
    pub dropped: usize,
    /// Objects of unregistered types that were skipped
    pub skipped: usize,
}

impl<R> Default for ParsedDocument<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            included_count: 0,
            dropped: 0,
            skipped: 0,
        }
    }
}

impl<R> ParsedDocument<R> {
    /// Records from the `included` section
    pub fn included(&self) -> &[R] {
        &self.records[..self.included_count]
    }

    /// Records from the `data` section
    pub fn primary(&self) -> &[R] {
        &self.records[self.included_count..]
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// What happened to one resource object
enum ObjectOutcome<R> {
    Parsed(R),
    Skipped,
    Dropped,
}

/// Converts documents into records and commits them to a database
pub struct Parser<R> {
    registry: Arc<TypeRegistry<R>>,
    database: Database<R>,
}

impl<R: Record> Parser<R> {
    /// Create a parser writing into `database`
    pub fn new(registry: TypeRegistry<R>, database: Database<R>) -> Self {
        Self {
            registry: Arc::new(registry),
            database,
        }
    }

    pub fn registry(&self) -> &TypeRegistry<R> {
        &self.registry
    }

    pub fn database(&self) -> &Database<R> {
        &self.database
    }

    /// Parse a document on the blocking pool.
    ///
    /// Resolves once, with the complete result for the document.
    pub async fn parse_in_background(&self, document: Value) -> Result<ParsedDocument<R>> {
        let parser = self.clone();
        tokio::task::spawn_blocking(move || parser.parse(&document))
            .await
            .map_err(|e| Error::parse(format!("parse task failed: {e}")))?
    }

    /// Parse a document on the calling thread.
    ///
    /// A document that is not an object, or has neither `included` nor
    /// `data`, parses to an empty result.
    ///
    /// Records with an incomplete key are dropped before either commit, so
    /// once `included` is committed the `data` commit cannot be rejected.
    pub fn parse(&self, document: &Value) -> Result<ParsedDocument<R>> {
        let mut parsed = ParsedDocument::default();
        let Some(root) = document.as_object() else {
            debug!("Document is not a JSON object; nothing to parse");
            return Ok(parsed);
        };

        let context = ParseContext::new(self.database.clone());

        if let Some(included) = root.get("included") {
            let records = self.parse_section(included, &context, &mut parsed);
            self.database.add_or_update_all(&records)?;
            parsed.included_count = records.len();
            parsed.records = records;
        }

        if let Some(data) = root.get("data") {
            let records = self.parse_section(data, &context, &mut parsed);
            self.database.add_or_update_all(&records)?;
            parsed.records.extend(records);
        }

        if parsed.dropped > 0 {
            warn!(
                "Dropped {} malformed resource object(s) while parsing",
                parsed.dropped
            );
        }
        debug!(
            "Parsed {} record(s) ({} included, {} skipped)",
            parsed.records.len(),
            parsed.included_count,
            parsed.skipped
        );

        Ok(parsed)
    }

    fn parse_section(
        &self,
        section: &Value,
        context: &ParseContext<R>,
        parsed: &mut ParsedDocument<R>,
    ) -> Vec<R> {
        let objects: &[Value] = match section {
            Value::Array(items) => items,
            Value::Object(_) => std::slice::from_ref(section),
            _ => &[],
        };

        let mut records = Vec::with_capacity(objects.len());
        for object in objects {
            match self.parse_object(object, context) {
                ObjectOutcome::Parsed(record) => records.push(record),
                ObjectOutcome::Skipped => parsed.skipped += 1,
                ObjectOutcome::Dropped => parsed.dropped += 1,
            }
        }
        records
    }

    fn parse_object(&self, object: &Value, context: &ParseContext<R>) -> ObjectOutcome<R> {
        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            debug!("Dropping resource object without a type");
            return ObjectOutcome::Dropped;
        };

        let Some(constructor) = self.registry.get(kind) else {
            debug!("Skipping unregistered type '{}'", kind);
            return ObjectOutcome::Skipped;
        };

        let resource = match Resource::from_value(object) {
            Ok(resource) => resource,
            Err(e) => {
                debug!("Dropping malformed '{}' object: {}", kind, e);
                return ObjectOutcome::Dropped;
            }
        };

        match constructor(&resource, context) {
            Some(record) if record.key().is_valid() => ObjectOutcome::Parsed(record),
            _ => {
                debug!(
                    "Constructor rejected '{}' object {}",
                    kind,
                    resource.identifier().id
                );
                ObjectOutcome::Dropped
            }
        }
    }
}

impl<R> Clone for Parser<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            database: self.database.clone(),
        }
    }
}

impl<R> std::fmt::Debug for Parser<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
