//! In-process memory backend built on `moka`.
//!
//! Entries live in one `moka::sync::Cache` keyed by `(group, key)`. Each entry
//! carries its own lifetime, and expired entries are reclaimed by moka's
//! housekeeping whether or not they are read again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::notification::RemovalCause;
use moka::sync::Cache;
use tracing::debug;

use super::{CacheBackend, CleanMode};
use crate::error::{CacheError, Result};

type EntryKey = (String, String);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires every entry after the lifetime it was stored with.
struct PerEntryTtl;

impl Expiry<EntryKey, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &EntryKey,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &EntryKey,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Entries held in process memory.
#[derive(Debug)]
pub struct MemoryBackend {
    entries: Cache<EntryKey, Entry>,
    evictions: Arc<AtomicU64>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        let evictions = Arc::new(AtomicU64::new(0));
        let counter = evictions.clone();

        let entries = Cache::builder()
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _entry, cause: RemovalCause| {
                if cause.was_evicted() {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
            })
            .support_invalidation_closures()
            .build();

        Self { entries, evictions }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries across all groups.
    pub fn len(&self) -> usize {
        self.entries.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries physically held, including expired ones not yet reclaimed.
    pub fn held(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    /// Entries dropped because their lifetime ran out.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn entry_key(group: &str, key: &str) -> EntryKey {
        (group.to_string(), key.to_string())
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, group: &str, key: &str) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(&Self::entry_key(group, key))
            .map(|entry| entry.value))
    }

    fn store(&self, group: &str, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            Self::entry_key(group, key),
            Entry {
                value: value.to_string(),
                ttl,
            },
        );
        Ok(())
    }

    fn remove(&self, group: &str, key: &str) -> Result<bool> {
        let entry_key = Self::entry_key(group, key);
        let live = self.entries.contains_key(&entry_key);
        self.entries.invalidate(&entry_key);
        Ok(live)
    }

    fn clean(&self, scope: &str, mode: CleanMode) -> Result<u64> {
        let removed = self
            .entries
            .iter()
            .filter(|(entry_key, _)| mode.matches(scope, &entry_key.0))
            .count() as u64;

        let scope = scope.to_string();
        self.entries
            .invalidate_entries_if(move |(group, _), _| mode.matches(&scope, group))
            .map_err(|e| CacheError::Unavailable(format!("memory cache invalidation: {e}")))?;

        debug!(cache.removed = removed, cache.mode = %mode, "Memory cache cleaned");

        Ok(removed)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
