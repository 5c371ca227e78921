//! Type registry and constructor context

use super::resource::{Resource, ResourceIdentifier};
use crate::store::{Database, Record, RecordKey};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds one typed record from one resource object.
///
/// Returning `None` marks the object as malformed; it is dropped.
pub type Constructor<R> = Arc<dyn Fn(&Resource, &ParseContext<R>) -> Option<R> + Send + Sync>;

/// Read-only view of the database offered to constructors
///
/// While the `data` section is parsed, every record from the document's
/// `included` section is already committed and resolvable here.
pub struct ParseContext<R> {
    database: Database<R>,
}

impl<R: Record> ParseContext<R> {
    pub(crate) fn new(database: Database<R>) -> Self {
        Self { database }
    }

    /// Look up a record by key
    pub fn get(&self, key: &RecordKey) -> Option<R> {
        self.database.get(key)
    }

    /// Look up a record by type and id
    pub fn get_by_id(&self, kind: &str, id: &str) -> Option<R> {
        self.database.get_by_id(kind, id)
    }

    /// Resolve one resource identifier
    pub fn resolve(&self, identifier: &ResourceIdentifier) -> Option<R> {
        self.database.get(&identifier.key())
    }

    /// Resolve several identifiers; unresolved ones are skipped
    pub fn resolve_all(&self, identifiers: &[ResourceIdentifier]) -> Vec<R> {
        let keys: Vec<RecordKey> = identifiers.iter().map(ResourceIdentifier::key).collect();
        self.database.get_many(&keys)
    }

    /// Resolve the to-one target of a named relationship
    pub fn resolve_related(&self, resource: &Resource, relationship: &str) -> Option<R> {
        resource
            .related(relationship)
            .and_then(|identifier| self.resolve(identifier))
    }
}

/// Maps JSON:API type names to record constructors
pub struct TypeRegistry<R> {
    constructors: HashMap<String, Constructor<R>>,
}

impl<R: Record> TypeRegistry<R> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for a type name
    pub fn register<F>(&mut self, kind: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&Resource, &ParseContext<R>) -> Option<R> + Send + Sync + 'static,
    {
        self.constructors.insert(kind.into(), Arc::new(constructor));
        self
    }

    /// Builder-style `register`
    #[must_use]
    pub fn with<F>(mut self, kind: impl Into<String>, constructor: F) -> Self
    where
        F: Fn(&Resource, &ParseContext<R>) -> Option<R> + Send + Sync + 'static,
    {
        self.register(kind, constructor);
        self
    }

    /// Whether a type name has a constructor
    pub fn is_registered(&self, kind: &str) -> bool {
        self.constructors.contains_key(kind)
    }

    /// Registered type names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub(crate) fn get(&self, kind: &str) -> Option<&Constructor<R>> {
        self.constructors.get(kind)
    }
}

impl TypeRegistry<Resource> {
    /// Registry that keeps the listed types as raw `Resource` records
    pub fn passthrough<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        kinds.into_iter().fold(Self::new(), |registry, kind| {
            registry.with(kind, |resource, _| Some(resource.clone()))
        })
    }
}

impl<R: Record> Default for TypeRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> std::fmt::Debug for TypeRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&String> = self.constructors.keys().collect();
        kinds.sort_unstable();
        f.debug_struct("TypeRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}
