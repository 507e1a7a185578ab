//! Redis backend for caches shared between processes or hosts.
//!
//! Entries live under `{prefix}:{group}:{key}` with a `SETEX` lifetime. Group
//! names never contain `:` or glob characters, so a group maps onto a single
//! `SCAN MATCH` pattern.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use redis::{Client, Commands, Connection};
use tracing::{debug, instrument};

use super::{CacheBackend, CleanMode};
use crate::error::{CacheError, Result};

const SCAN_BATCH: usize = 100;

/// Redis-backed cache with a single synchronous connection.
pub struct RedisBackend {
    conn: Mutex<Connection>,
    prefix: String,
}

impl std::fmt::Debug for RedisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBackend")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisBackend {
    /// Connects to Redis.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `prefix` - Namespace prepended to every stored key
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Connection` if the URL is invalid or the server
    /// cannot be reached.
    pub fn connect(redis_url: &str, prefix: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let conn = client.get_connection()?;

        Ok(Self {
            conn: Mutex::new(conn),
            prefix: prefix.to_string(),
        })
    }

    fn storage_key(&self, group: &str, key: &str) -> String {
        format!("{}:{}:{}", self.prefix, group, key)
    }

    fn pattern(&self, scope: &str, mode: CleanMode) -> String {
        match mode {
            CleanMode::Group => format!("{}:{}:*", self.prefix, scope),
            CleanMode::Prefix => format!("{}:{}*", self.prefix, scope),
        }
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| CacheError::Unavailable("redis connection lock poisoned".into()))
    }
}

impl CacheBackend for RedisBackend {
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    fn get(&self, group: &str, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn()?;
        let value: Option<String> = conn.get(self.storage_key(group, key))?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    fn store(&self, group: &str, key: &str, value: &str, ttl: Duration) -> Result<()> {
        // SETEX rejects a zero lifetime
        let secs = ttl.as_secs().max(1);
        let mut conn = self.conn()?;
        conn.set_ex::<_, _, ()>(self.storage_key(group, key), value, secs)?;

        debug!(cache.key = %key, cache.ttl_secs = %secs, "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    fn remove(&self, group: &str, key: &str) -> Result<bool> {
        let mut conn = self.conn()?;
        let deleted: u64 = conn.del(self.storage_key(group, key))?;
        Ok(deleted > 0)
    }

    /// Uses SCAN, which is safe for production but may be slow with many keys.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    fn clean(&self, scope: &str, mode: CleanMode) -> Result<u64> {
        let pattern = self.pattern(scope, mode);
        let mut conn = self.conn()?;
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query(&mut *conn)?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys)?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
