//! Store types
//!
//! Record identity, cache entries and sweep results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a record: its JSON:API type and id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Resource type name (e.g. "anime", "genres")
    pub kind: String,
    /// Resource id
    pub id: String,
}

impl RecordKey {
    /// Create a record key
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// A key is storable only when both parts are non-empty
    pub fn is_valid(&self) -> bool {
        !self.kind.is_empty() && !self.id.is_empty()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// A typed domain record that can live in a `Database`
///
/// Usually implemented by an application enum covering every domain type
/// the registry constructs.
pub trait Record: Clone + Send + Sync + 'static {
    /// Identity of this record
    fn key(&self) -> RecordKey;

    /// Veto eviction by a sweep. Defaults to allowing it.
    fn can_clear_from_cache(&self) -> bool {
        true
    }

    /// Called when a sweep is about to evict this record.
    ///
    /// Returns keys of dependent records (e.g. alternate titles owned by an
    /// anime) that are deleted together with it.
    fn will_clear_from_cache(&self) -> Vec<RecordKey> {
        Vec::new()
    }
}

/// A stored record and the time of its last cache-aware write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<R> {
    /// The stored record
    pub record: R,
    /// Set on every write of a cacheable kind; `None` means never stamped
    #[serde(default)]
    pub last_local_update: Option<DateTime<Utc>>,
}

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Expired records deleted
    pub evicted: usize,
    /// Dependent records deleted alongside evicted ones
    pub cascaded: usize,
    /// Expired records kept because they vetoed eviction
    pub vetoed: usize,
}

impl SweepReport {
    /// Total records removed
    pub fn removed(&self) -> usize {
        self.evicted + self.cascaded
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_record_key_display() {
        let key = RecordKey::new("anime", "1");
        assert_eq!(key.to_string(), "anime:1");
    }

    #[test]
    fn test_record_key_validity() {
        assert!(RecordKey::new("anime", "1").is_valid());
        assert!(!RecordKey::new("", "1").is_valid());
        assert!(!RecordKey::new("anime", "").is_valid());
    }

    #[test]
    fn test_sweep_report_removed() {
        let report = SweepReport {
            evicted: 2,
            cascaded: 3,
            vetoed: 1,
        };
        assert_eq!(report.removed(), 5);
    }
}
