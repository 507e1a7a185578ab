//! Cache settings.
//!
//! This module provides the cache configuration consumed by the cache facade,
//! loaded once from environment variables at startup.

use std::env;
use std::path::PathBuf;

use crate::handler::CacheHandler;

const DEFAULT_CACHE_TIME_MINUTES: u64 = 15;
const DEFAULT_KEY_PREFIX: &str = "stowage";
const DEFAULT_CACHE_PATH: &str = "storage/cache";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Cache settings loaded from environment variables.
///
/// # Environment Variables
///
/// - `CACHING`: Whether caching is switched on (default: `0`)
/// - `CACHE_TIME`: Base lifetime in minutes (default: `15`)
/// - `CACHE_HANDLER`: Backend selector, one of `file`, `redis`, `memory`, `none` (default: `file`)
/// - `DEBUG`: Debug mode; forces caching off whatever `CACHING` says (default: `0`)
/// - `CACHE_PREFIX`: Prefix for all cache keys (default: `stowage`)
/// - `CACHE_PATH`: Directory used by the file backend (default: `storage/cache`)
/// - `REDIS_URL`: Redis connection URL (default: `redis://127.0.0.1:6379`)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheSettings {
    /// The configured caching flag, before the debug override.
    pub caching: bool,

    /// Base lifetime in minutes.
    pub cache_time: u64,

    /// Which storage backend to use.
    pub cache_handler: CacheHandler,

    /// Debug mode disables caching unconditionally.
    pub debug: bool,

    /// Prefix for all cache keys to avoid collisions.
    pub key_prefix: String,

    /// Root directory of the file backend.
    pub cache_path: PathBuf,

    /// Redis connection URL.
    pub redis_url: String,
}

impl CacheSettings {
    /// Load settings from the process environment.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    ///
    /// `from_env` is this function over `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            caching: lookup("CACHING")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.caching),
            cache_time: lookup("CACHE_TIME")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.cache_time),
            cache_handler: lookup("CACHE_HANDLER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_handler),
            debug: lookup("DEBUG")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.debug),
            key_prefix: lookup("CACHE_PREFIX")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.key_prefix),
            cache_path: lookup("CACHE_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_path),
            redis_url: lookup("REDIS_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.redis_url),
        }
    }

    /// Whether caching is effectively on. See [`effective_enabled`].
    pub fn is_enabled(&self) -> bool {
        effective_enabled(self.caching, self.debug)
    }

    /// Build a prefixed cache key.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let settings = CacheSettings::default();
    /// let key = settings.prefixed_key("article:42");
    /// // Returns "stowage:article:42"
    /// ```
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_cache_time(mut self, minutes: u64) -> Self {
        self.cache_time = minutes;
        self
    }

    pub fn with_handler(mut self, handler: CacheHandler) -> Self {
        self.cache_handler = handler;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = path.into();
        self
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            caching: false,
            cache_time: DEFAULT_CACHE_TIME_MINUTES,
            cache_handler: CacheHandler::default(),
            debug: false,
            key_prefix: DEFAULT_KEY_PREFIX.into(),
            cache_path: PathBuf::from(DEFAULT_CACHE_PATH),
            redis_url: DEFAULT_REDIS_URL.into(),
        }
    }
}

/// Decide whether caching is on.
///
/// Debug mode always wins over the configured flag.
pub fn effective_enabled(config_flag: bool, debug_flag: bool) -> bool {
    config_flag && !debug_flag
}

/// Parse a boolean-like setting such as `1`, `true`, `yes` or `on`.
///
/// Returns `None` for anything unrecognised.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
