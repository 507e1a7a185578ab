//! Read-through cache facade.
//!
//! The facade fails open: a backend that cannot be reached, a value that
//! cannot be serialized or an invalid group never surfaces as an error.
//! The failure is logged, the producer's value is returned uncached, and the
//! outcome is marked [`CacheStatus::Degraded`] so callers and tests can see
//! that the cache path was skipped.
//!
//! Concurrent callers racing on a cold key may each run their producer and
//! each write the entry. No per-key locking is done here; producers that are
//! expensive or not idempotent need their own coordination.

use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use stowage_config::CacheSettings;
use tracing::{debug, error, info, warn};

use crate::backend::{self, CacheBackend, CleanMode, NullBackend};
use crate::error::CacheError;
use crate::keys::validate_group;
use crate::lifetime::minutes;

/// Where the value of a read came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the backend; the producer did not run.
    Hit,
    /// Produced and written to the backend.
    Stored,
    /// Caching is off; produced and not written.
    Disabled,
    /// The cache path failed; produced and returned uncached.
    Degraded { reason: String },
}

/// A value plus how the cache handled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOutcome<T> {
    pub value: T,
    pub status: CacheStatus,
}

impl<T> CacheOutcome<T> {
    pub fn new(value: T, status: CacheStatus) -> Self {
        Self { value, status }
    }

    pub fn into_inner(self) -> T {
        self.value
    }

    pub fn is_hit(&self) -> bool {
        self.status == CacheStatus::Hit
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, CacheStatus::Degraded { .. })
    }
}

/// Facade counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stores: u64,
    pub degraded: u64,
    pub bypassed: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    stores: AtomicU64,
    degraded: AtomicU64,
    bypassed: AtomicU64,
}

impl AtomicStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stores: self.stores.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            bypassed: self.bypassed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Active,
    Disabled,
    Unavailable(String),
}

/// Read-through access to a cache backend for one default group.
#[derive(Debug)]
pub struct CacheFacade {
    backend: Arc<dyn CacheBackend>,
    default_group: String,
    lifetime: Duration,
    state: State,
    stats: AtomicStats,
}

impl CacheFacade {
    /// Creates a facade over an existing backend.
    ///
    /// Settings are read once here: the base lifetime becomes the default
    /// entry lifetime, and reads are switched off when caching is disabled
    /// or debug mode is on. Debug mode wins over `caching`.
    pub fn new(
        settings: &CacheSettings,
        backend: Arc<dyn CacheBackend>,
        default_group: impl Into<String>,
    ) -> Self {
        let state = if settings.is_enabled() {
            State::Active
        } else {
            if settings.caching && settings.debug {
                info!("Caching disabled by debug mode");
            }
            State::Disabled
        };

        Self {
            backend,
            default_group: default_group.into(),
            lifetime: minutes(settings.cache_time),
            state,
            stats: AtomicStats::default(),
        }
    }

    /// Creates a facade with the backend selected by `settings.cache_handler`.
    ///
    /// If the backend cannot be created the facade still works, but every
    /// read degrades and every invalidation reports `false`.
    pub fn from_settings(settings: &CacheSettings, default_group: impl Into<String>) -> Self {
        match backend::from_settings(settings) {
            Ok(backend) => Self::new(settings, backend, default_group),
            Err(e) => {
                warn!(
                    error = %e,
                    cache.handler = %settings.cache_handler,
                    "Cache backend unavailable; continuing without caching"
                );
                let mut facade = Self::new(settings, Arc::new(NullBackend::new()), default_group);
                facade.state = State::Unavailable(e.to_string());
                facade
            }
        }
    }

    /// Overrides the default entry lifetime.
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Whether reads go through the backend.
    pub fn is_enabled(&self) -> bool {
        self.state == State::Active
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    /// Returns the cached value for `key` in the default group, or runs
    /// `producer`, stores its result and returns it.
    pub fn get<T, F>(&self, key: &str, producer: F) -> CacheOutcome<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        self.get_in(&self.default_group, key, self.lifetime, producer)
    }

    /// [`get`](Self::get) with an explicit group and lifetime.
    pub fn get_in<T, F>(&self, group: &str, key: &str, ttl: Duration, producer: F) -> CacheOutcome<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.try_get_in(group, key, ttl, || Ok::<T, Infallible>(producer())) {
            Ok(outcome) => outcome,
            Err(never) => match never {},
        }
    }

    /// [`get`](Self::get) with a fallible producer.
    ///
    /// A producer error is returned as is and nothing is stored.
    pub fn try_get<T, E, F>(&self, key: &str, producer: F) -> Result<CacheOutcome<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        self.try_get_in(&self.default_group, key, self.lifetime, producer)
    }

    /// [`try_get`](Self::try_get) with an explicit group and lifetime.
    pub fn try_get_in<T, E, F>(
        &self,
        group: &str,
        key: &str,
        ttl: Duration,
        producer: F,
    ) -> Result<CacheOutcome<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        match &self.state {
            State::Active => {}
            State::Disabled => {
                AtomicStats::bump(&self.stats.bypassed);
                return producer().map(|value| CacheOutcome::new(value, CacheStatus::Disabled));
            }
            State::Unavailable(reason) => return self.degrade(producer, reason.clone()),
        }

        if let Err(e) = validate_group(group) {
            warn!(error = %e, cache.key = %key, "Invalid cache group; continuing without cache");
            return self.degrade(producer, e.to_string());
        }

        match self.backend.get(group, key) {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    AtomicStats::bump(&self.stats.hits);
                    debug!(cache.group = %group, cache.key = %key, "Cache hit");
                    return Ok(CacheOutcome::new(value, CacheStatus::Hit));
                }
                Err(e) => {
                    error!(cache.group = %group, cache.key = %key, error = %e, "Failed to deserialize cached value");
                }
            },
            Ok(None) => {
                debug!(cache.group = %group, cache.key = %key, "Cache miss");
            }
            Err(e) => {
                warn!(
                    cache.group = %group,
                    cache.key = %key,
                    cache.backend = self.backend.name(),
                    error = %e,
                    "Cache read failed; continuing without cache"
                );
                return self.degrade(producer, e.to_string());
            }
        }

        AtomicStats::bump(&self.stats.misses);
        let value = producer()?;

        let stored = serde_json::to_string(&value)
            .map_err(CacheError::from)
            .and_then(|json| self.backend.store(group, key, &json, ttl));

        match stored {
            Ok(()) => {
                AtomicStats::bump(&self.stats.stores);
                debug!(cache.group = %group, cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Cache set");
                Ok(CacheOutcome::new(value, CacheStatus::Stored))
            }
            Err(e) => {
                AtomicStats::bump(&self.stats.degraded);
                warn!(
                    cache.group = %group,
                    cache.key = %key,
                    cache.backend = self.backend.name(),
                    error = %e,
                    "Failed to cache value"
                );
                Ok(CacheOutcome::new(
                    value,
                    CacheStatus::Degraded {
                        reason: e.to_string(),
                    },
                ))
            }
        }
    }

    /// Deletes one entry, from the default group unless `group` is given.
    ///
    /// Returns whether an entry existed and was removed. A missing key is
    /// not an error. Works while reads are disabled, so earlier entries do
    /// not outlive a write.
    pub fn remove(&self, key: &str, group: Option<&str>) -> bool {
        let group = group.unwrap_or(&self.default_group);
        if !self.invalidation_allowed(group) {
            return false;
        }

        match self.backend.remove(group, key) {
            Ok(removed) => {
                debug!(cache.group = %group, cache.key = %key, cache.removed = removed, "Cache invalidated");
                removed
            }
            Err(e) => {
                AtomicStats::bump(&self.stats.degraded);
                warn!(error = %e, cache.group = %group, cache.key = %key, "Failed to invalidate cache entry");
                false
            }
        }
    }

    /// Deletes every entry in the scope selected by `group` (default group
    /// when `None`) and `mode`.
    ///
    /// Returns `true` when the backend completed the operation.
    pub fn clean(&self, group: Option<&str>, mode: CleanMode) -> bool {
        let scope = group.unwrap_or(&self.default_group);
        if !self.invalidation_allowed(scope) {
            return false;
        }

        match self.backend.clean(scope, mode) {
            Ok(deleted) => {
                debug!(cache.scope = %scope, cache.mode = %mode, cache.deleted = deleted, "Cache group cleaned");
                true
            }
            Err(e) => {
                AtomicStats::bump(&self.stats.degraded);
                warn!(error = %e, cache.scope = %scope, cache.mode = %mode, "Failed to clean cache group");
                false
            }
        }
    }

    fn invalidation_allowed(&self, group: &str) -> bool {
        if let State::Unavailable(reason) = &self.state {
            debug!(cache.group = %group, reason = %reason, "Cache unavailable; nothing to invalidate");
            return false;
        }
        if let Err(e) = validate_group(group) {
            warn!(error = %e, "Invalid cache group");
            return false;
        }
        true
    }

    fn degrade<T, E, F>(&self, producer: F, reason: String) -> Result<CacheOutcome<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        AtomicStats::bump(&self.stats.degraded);
        producer().map(|value| CacheOutcome::new(value, CacheStatus::Degraded { reason }))
    }
}
