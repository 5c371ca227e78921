//! Parser module
//!
//! Turns JSON:API documents into typed records.
//!
//! # Overview
//!
//! The parser module provides:
//! - `Resource` - A JSON:API resource object (`type`, `id`, `attributes`,
//!   `relationships`) with typed accessors
//! - `TypeRegistry` - Per-type constructors from `Resource` to a record
//! - `Parser` - Two-phase document parsing: the `included` section is parsed
//!   and committed to the database before the `data` section, so data
//!   constructors can resolve their relationships through `ParseContext`
//!
//! Malformed resource objects are dropped one at a time and counted; they
//! never fail the document.

mod document;
mod registry;
mod resource;

pub use document::{ParsedDocument, Parser};
pub use registry::{Constructor, ParseContext, TypeRegistry};
pub use resource::{Relationship, RelationshipData, Resource, ResourceIdentifier};

#[cfg(test)]
mod tests;
