//! Database implementation
//!
//! One `RwLock` guards each realm. Writes and sweeps take the write lock, so
//! a sweep never interleaves with an upsert; reads take the read lock and
//! always see whole records.

use super::types::{CacheEntry, Record, RecordKey, SweepReport};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info};

struct Inner<R> {
    entries: BTreeMap<RecordKey, CacheEntry<R>>,
    cacheable: BTreeSet<String>,
}

impl<R> Default for Inner<R> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            cacheable: BTreeSet::new(),
        }
    }
}

/// On-disk snapshot layout
#[derive(Serialize, Deserialize)]
struct Snapshot<R> {
    #[serde(default)]
    cacheable: Vec<String>,
    #[serde(default = "Vec::new")]
    entries: Vec<CacheEntry<R>>,
}

/// Keyed record store for one realm
pub struct Database<R> {
    inner: Arc<RwLock<Inner<R>>>,
}

impl<R: Record> Database<R> {
    /// Create an empty database
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }

    // Writers validate and run record hooks before mutating, so a lock
    // poisoned by a panic still holds whole records.
    fn read(&self) -> RwLockReadGuard<'_, Inner<R>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<R>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Cache registration
    // ========================================================================

    /// Opt a record kind into TTL eviction and write stamping
    pub fn register_cacheable(&self, kind: impl Into<String>) -> Result<()> {
        let kind = kind.into();
        debug!("Registering cacheable kind '{}'", kind);
        self.write().cacheable.insert(kind);
        Ok(())
    }

    /// Whether a kind participates in caching
    pub fn is_cacheable(&self, kind: &str) -> bool {
        self.read().cacheable.contains(kind)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Insert or replace one record
    pub fn add_or_update(&self, record: R) -> Result<()> {
        self.add_or_update_at(std::slice::from_ref(&record), Utc::now())
    }

    /// Insert or replace several records in one write
    pub fn add_or_update_all(&self, records: &[R]) -> Result<()> {
        self.add_or_update_at(records, Utc::now())
    }

    /// Insert or replace records, stamping cacheable kinds with `now`.
    ///
    /// Either every record is written or none is.
    pub fn add_or_update_at(&self, records: &[R], now: DateTime<Utc>) -> Result<()> {
        let keyed: Vec<(RecordKey, R)> = records.iter().map(|r| (r.key(), r.clone())).collect();

        if let Some((key, _)) = keyed.iter().find(|(key, _)| !key.is_valid()) {
            return Err(Error::store(format!(
                "refusing to write record with incomplete key '{key}'"
            )));
        }

        let mut inner = self.write();
        for (key, record) in keyed {
            let last_local_update = inner.cacheable.contains(&key.kind).then_some(now);
            inner.entries.insert(
                key,
                CacheEntry {
                    record,
                    last_local_update,
                },
            );
        }

        debug!("Committed {} record(s)", records.len());
        Ok(())
    }

    /// Delete one record. Returns whether it was present.
    pub fn delete(&self, record: &R) -> Result<bool> {
        self.delete_key(&record.key())
    }

    /// Delete by key. Returns whether it was present.
    pub fn delete_key(&self, key: &RecordKey) -> Result<bool> {
        Ok(self.write().entries.remove(key).is_some())
    }

    /// Delete several records in one write. Returns how many were present.
    pub fn delete_all(&self, records: &[R]) -> Result<usize> {
        let keys: Vec<RecordKey> = records.iter().map(Record::key).collect();
        let mut inner = self.write();
        Ok(keys
            .iter()
            .filter(|key| inner.entries.remove(key).is_some())
            .count())
    }

    /// Remove every record (cacheable registrations are kept)
    pub fn clear(&self) -> Result<()> {
        self.write().entries.clear();
        Ok(())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Look up a record by key
    pub fn get(&self, key: &RecordKey) -> Option<R> {
        self.read().entries.get(key).map(|e| e.record.clone())
    }

    /// Look up a record by type and id
    pub fn get_by_id(&self, kind: &str, id: &str) -> Option<R> {
        self.get(&RecordKey::new(kind, id))
    }

    /// Look up several records; missing keys are skipped
    pub fn get_many(&self, keys: &[RecordKey]) -> Vec<R> {
        let inner = self.read();
        keys.iter()
            .filter_map(|key| inner.entries.get(key).map(|e| e.record.clone()))
            .collect()
    }

    /// Every stored record, ordered by key
    pub fn all(&self) -> Vec<R> {
        self.read()
            .entries
            .values()
            .map(|e| e.record.clone())
            .collect()
    }

    /// Every stored record of one kind, ordered by id
    pub fn all_of_kind(&self, kind: &str) -> Vec<R> {
        self.read()
            .entries
            .iter()
            .filter(|(key, _)| key.kind == kind)
            .map(|(_, e)| e.record.clone())
            .collect()
    }

    /// The stored entry (record plus write stamp)
    pub fn entry(&self, key: &RecordKey) -> Option<CacheEntry<R>> {
        self.read().entries.get(key).cloned()
    }

    /// Time of the last cache-aware write of a record
    pub fn last_local_update(&self, key: &RecordKey) -> Option<DateTime<Utc>> {
        self.read()
            .entries
            .get(key)
            .and_then(|e| e.last_local_update)
    }

    /// Whether a record is stored
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.read().entries.contains_key(key)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    /// Whether the database is empty
    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    /// Evict cacheable records not written within `ttl`
    pub fn sweep(&self, ttl: Duration) -> Result<SweepReport> {
        self.sweep_at(ttl, Utc::now())
    }

    /// Evict cacheable records whose last write is older than `now - ttl`.
    ///
    /// Unstamped records and kinds not registered as cacheable are never
    /// touched. Records whose `can_clear_from_cache` returns false are kept;
    /// the dependents named by `will_clear_from_cache` go with the rest.
    pub fn sweep_at(&self, ttl: Duration, now: DateTime<Utc>) -> Result<SweepReport> {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let mut inner = self.write();
        let mut report = SweepReport::default();

        // All hooks run before the first removal.
        let mut expired = Vec::new();
        let mut dependents = Vec::new();
        for (key, entry) in &inner.entries {
            if !inner.cacheable.contains(&key.kind) {
                continue;
            }
            let Some(stamp) = entry.last_local_update else {
                continue;
            };
            if now.signed_duration_since(stamp) <= ttl {
                continue;
            }
            if !entry.record.can_clear_from_cache() {
                report.vetoed += 1;
                continue;
            }
            dependents.extend(entry.record.will_clear_from_cache());
            expired.push(key.clone());
        }

        for key in &expired {
            if inner.entries.remove(key).is_some() {
                report.evicted += 1;
            }
        }
        for key in &dependents {
            if inner.entries.remove(key).is_some() {
                report.cascaded += 1;
            }
        }

        if report.removed() > 0 || report.vetoed > 0 {
            info!(
                "Cache sweep removed {} record(s) ({} cascaded), {} vetoed",
                report.removed(),
                report.cascaded,
                report.vetoed
            );
        }

        Ok(report)
    }
}

// ============================================================================
// Persistence
// ============================================================================

impl<R: Record + Serialize + DeserializeOwned> Database<R> {
    /// Write a JSON snapshot of the realm (temp file + rename)
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = {
            let inner = self.read();
            let snapshot = Snapshot {
                cacheable: inner.cacheable.iter().cloned().collect(),
                entries: inner.entries.values().cloned().collect(),
            };
            serde_json::to_string_pretty(&snapshot)
                .map_err(|e| Error::store(format!("Failed to serialize snapshot: {e}")))?
        };

        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::store(format!("Failed to write snapshot: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::store(format!("Failed to rename snapshot: {e}")))?;

        debug!("Saved database snapshot to {}", path.display());
        Ok(())
    }

    /// Load a realm from a snapshot; a missing file yields an empty realm
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let database = Self::new();
        if !path.exists() {
            return Ok(database);
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::store(format!("Failed to read snapshot: {e}")))?;
        let snapshot: Snapshot<R> = serde_json::from_str(&contents)
            .map_err(|e| Error::store(format!("Failed to parse snapshot: {e}")))?;

        {
            let mut inner = database.write();
            inner.cacheable = snapshot.cacheable.into_iter().collect();
            for entry in snapshot.entries {
                let key = entry.record.key();
                if key.is_valid() {
                    inner.entries.insert(key, entry);
                }
            }
        }

        debug!(
            "Loaded {} record(s) from {}",
            database.len(),
            path.display()
        );
        Ok(database)
    }
}

impl<R: Record> Default for Database<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Database<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R> std::fmt::Debug for Database<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
