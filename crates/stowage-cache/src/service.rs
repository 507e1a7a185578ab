//! Per-extension cache service.
//!
//! Bundles the key builder, the lifetime resolver and a facade under one
//! namespace. Entries of type `t` live in the group `{namespace}.{t}`, so one
//! type can be flushed on its own and `{namespace}.` covers the whole
//! extension. The facade's default group is `{namespace}.default`, so plain
//! `facade().get(..)` entries are covered by [`CacheService::flush_all`] too.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use stowage_config::CacheSettings;

use crate::backend::{CacheBackend, CleanMode};
use crate::facade::{CacheFacade, CacheOutcome};
use crate::keys::{CacheParams, Identifier, KeyBuilder};
use crate::lifetime::LifetimeResolver;

/// Type tag of the facade's default group.
pub const DEFAULT_TYPE: &str = "default";

#[derive(Debug)]
pub struct CacheService {
    namespace: String,
    keys: KeyBuilder,
    lifetimes: LifetimeResolver,
    facade: CacheFacade,
}

impl CacheService {
    /// Creates the service with the backend named in `settings`.
    pub fn new(settings: &CacheSettings, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let facade = CacheFacade::from_settings(settings, default_group(&namespace));
        Self::assemble(settings, namespace, facade)
    }

    /// Creates the service over an existing backend.
    pub fn with_backend(
        settings: &CacheSettings,
        backend: Arc<dyn CacheBackend>,
        namespace: impl Into<String>,
    ) -> Self {
        let namespace = namespace.into();
        let facade = CacheFacade::new(settings, backend, default_group(&namespace));
        Self::assemble(settings, namespace, facade)
    }

    fn assemble(settings: &CacheSettings, namespace: String, facade: CacheFacade) -> Self {
        Self {
            keys: KeyBuilder::new(settings.prefixed_key(&namespace)),
            lifetimes: LifetimeResolver::new(settings),
            namespace,
            facade,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn facade(&self) -> &CacheFacade {
        &self.facade
    }

    pub fn generate_key(
        &self,
        cache_type: &str,
        identifier: Option<&Identifier>,
        params: &CacheParams,
    ) -> String {
        self.keys.generate_key(cache_type, identifier, params)
    }

    /// Lifetime of `cache_type` in minutes.
    pub fn get_lifetime(&self, cache_type: &str) -> u64 {
        self.lifetimes.get_lifetime(cache_type)
    }

    pub fn is_cache_enabled(&self) -> bool {
        self.lifetimes.is_cache_enabled()
    }

    /// Group holding entries of `cache_type`.
    pub fn group_for(&self, cache_type: &str) -> String {
        format!("{}.{}", self.namespace, cache_type)
    }

    /// Group of a key generated by this service, taken from its type segment.
    ///
    /// Returns `None` for keys outside the namespace.
    pub fn group_for_key(&self, key: &str) -> Option<String> {
        let cache_type = key
            .strip_prefix(self.keys.prefix())?
            .strip_prefix(':')?
            .split(':')
            .next()
            .filter(|t| !t.is_empty())?;
        Some(self.group_for(cache_type))
    }

    /// Read-through for one `(type, identifier, params)` entry, cached for
    /// the lifetime of `cache_type`.
    pub fn remember<T, F>(
        &self,
        cache_type: &str,
        identifier: Option<&Identifier>,
        params: &CacheParams,
        producer: F,
    ) -> CacheOutcome<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        let key = self.generate_key(cache_type, identifier, params);
        self.facade.get_in(
            &self.group_for(cache_type),
            &key,
            self.lifetimes.lifetime(cache_type),
            producer,
        )
    }

    /// [`remember`](Self::remember) with a fallible producer.
    pub fn try_remember<T, E, F>(
        &self,
        cache_type: &str,
        identifier: Option<&Identifier>,
        params: &CacheParams,
        producer: F,
    ) -> Result<CacheOutcome<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T, E>,
    {
        let key = self.generate_key(cache_type, identifier, params);
        self.facade.try_get_in(
            &self.group_for(cache_type),
            &key,
            self.lifetimes.lifetime(cache_type),
            producer,
        )
    }

    /// Removes the parameterless entry of one entity.
    pub fn forget(&self, cache_type: &str, identifier: &Identifier) -> bool {
        let key = self.generate_key(cache_type, Some(identifier), &CacheParams::new());
        self.facade.remove(&key, Some(&self.group_for(cache_type)))
    }

    /// Removes every entry of `cache_type`.
    pub fn flush_type(&self, cache_type: &str) -> bool {
        self.facade
            .clean(Some(&self.group_for(cache_type)), CleanMode::Group)
    }

    /// Removes every entry of the namespace.
    pub fn flush_all(&self) -> bool {
        self.facade
            .clean(Some(&format!("{}.", self.namespace)), CleanMode::Prefix)
    }

    pub fn remove(&self, key: &str, group: Option<&str>) -> bool {
        self.facade.remove(key, group)
    }

    pub fn clean(&self, group: Option<&str>, mode: CleanMode) -> bool {
        self.facade.clean(group, mode)
    }
}

fn default_group(namespace: &str) -> String {
    format!("{namespace}.{DEFAULT_TYPE}")
}
