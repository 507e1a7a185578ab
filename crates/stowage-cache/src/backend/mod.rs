//! Cache storage backends.
//!
//! | Backend | Handler | Description |
//! |---------|---------|-------------|
//! | [`FileBackend`] | `file` | One JSON file per entry, one directory per group |
//! | [`RedisBackend`] | `redis` | Shared Redis server, `SETEX` per entry |
//! | [`MemoryBackend`] | `memory` | Process-local map, lost on exit |
//! | [`NullBackend`] | `none` | Stores nothing |
//!
//! Backends are addressed by `(group, key)`. Group names are checked with
//! [`validate_group`](crate::keys::validate_group) before they reach a
//! backend.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use stowage_config::{CacheHandler, CacheSettings};
use tracing::debug;

use crate::error::{CacheError, Result};

pub mod file;
pub mod memory;
pub mod null;
pub mod redis;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use null::NullBackend;
pub use redis::RedisBackend;

/// How `clean` selects the groups it empties.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CleanMode {
    /// Only the group whose name equals the given one.
    #[default]
    Group,
    /// Every group whose name starts with the given string. Plain string
    /// prefix: `com_art` matches `com_articles.list`.
    Prefix,
}

impl CleanMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Prefix => "prefix",
        }
    }

    /// Whether `group` falls under `scope` in this mode.
    pub fn matches(&self, scope: &str, group: &str) -> bool {
        match self {
            Self::Group => group == scope,
            Self::Prefix => group.starts_with(scope),
        }
    }
}

impl fmt::Display for CleanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CleanMode {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "prefix" => Ok(Self::Prefix),
            _ => Err(CacheError::InvalidCleanMode(s.to_string())),
        }
    }
}

/// Keyed storage with per-entry lifetimes.
///
/// Values are opaque strings; the facade serializes them.
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Returns the stored value, or `None` if absent or expired.
    fn get(&self, group: &str, key: &str) -> Result<Option<String>>;

    /// Stores `value`, replacing any previous entry.
    fn store(&self, group: &str, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Deletes one entry. `false` means there was nothing to delete.
    fn remove(&self, group: &str, key: &str) -> Result<bool>;

    /// Deletes every entry in the groups selected by `scope` and `mode`,
    /// returning how many were removed.
    fn clean(&self, scope: &str, mode: CleanMode) -> Result<u64>;

    /// Short backend name for logs (e.g. "file", "redis").
    fn name(&self) -> &'static str;
}

/// Creates the backend selected by `settings.cache_handler`.
///
/// # Errors
///
/// Fails if the backend cannot be reached or its storage prepared.
pub fn from_settings(settings: &CacheSettings) -> Result<Arc<dyn CacheBackend>> {
    let backend: Arc<dyn CacheBackend> = match settings.cache_handler {
        CacheHandler::File => Arc::new(FileBackend::new(&settings.cache_path)?),
        CacheHandler::Redis => Arc::new(RedisBackend::connect(
            &settings.redis_url,
            &settings.key_prefix,
        )?),
        CacheHandler::Memory => Arc::new(MemoryBackend::new()),
        CacheHandler::None => Arc::new(NullBackend::new()),
    };

    debug!(cache.backend = backend.name(), "Cache backend created");

    Ok(backend)
}
