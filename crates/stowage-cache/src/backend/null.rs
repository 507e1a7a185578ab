//! Null backend that doesn't store anything.

use std::time::Duration;

use super::{CacheBackend, CleanMode};
use crate::error::Result;

/// Backend that stores nothing.
///
/// Every read is a miss, every write is accepted and dropped. Used for the
/// `none` handler and as the stand-in when the configured backend cannot be
/// created.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl CacheBackend for NullBackend {
    fn get(&self, _group: &str, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn store(&self, _group: &str, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _group: &str, _key: &str) -> Result<bool> {
        Ok(false)
    }

    fn clean(&self, _scope: &str, _mode: CleanMode) -> Result<u64> {
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
