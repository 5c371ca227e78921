//! Store module
//!
//! The local object store that owns every parsed record.
//!
//! # Overview
//!
//! The store module provides:
//! - `Record` - Trait implemented by typed domain records (identity + cache hooks)
//! - `Database` - Keyed record store with per-record write stamps, one
//!   instance per realm (clones share the realm)
//! - `Database::sweep` - TTL eviction over kinds registered as cacheable
//! - `CacheSweeper` - Background task that sweeps on an interval
//! - JSON snapshot persistence for serializable records

mod database;
mod sweeper;
mod types;

pub use database::Database;
pub use sweeper::CacheSweeper;
pub use types::{CacheEntry, Record, RecordKey, SweepReport};
