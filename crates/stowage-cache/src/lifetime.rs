//! Cache lifetimes per content type.
//!
//! Every cache type gets a multiple of the configured base lifetime. Types
//! missing from [`MULTIPLIERS`] use [`DEFAULT_MULTIPLIER`]. Unknown types are
//! not an error.

use std::time::Duration;

use stowage_config::{CacheSettings, effective_enabled};

/// Multiplier for any type not listed in [`MULTIPLIERS`].
pub const DEFAULT_MULTIPLIER: u64 = 4;

/// Base-lifetime multipliers for the known cache types.
pub const MULTIPLIERS: &[(&str, u64)] = &[
    ("item", 24),
    ("list", 8),
    ("category", 48),
    ("count", 8),
    ("search", 1),
];

/// Maps cache types to lifetimes in minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifetimeResolver {
    base_minutes: u64,
    caching: bool,
    debug: bool,
}

impl LifetimeResolver {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            base_minutes: settings.cache_time,
            caching: settings.caching,
            debug: settings.debug,
        }
    }

    pub fn base_minutes(&self) -> u64 {
        self.base_minutes
    }

    /// Multiplier used for `cache_type`.
    pub fn multiplier(cache_type: &str) -> u64 {
        MULTIPLIERS
            .iter()
            .find(|(name, _)| *name == cache_type)
            .map(|(_, m)| *m)
            .unwrap_or(DEFAULT_MULTIPLIER)
    }

    /// Lifetime of `cache_type` in minutes.
    pub fn get_lifetime(&self, cache_type: &str) -> u64 {
        self.base_minutes.saturating_mul(Self::multiplier(cache_type))
    }

    /// Lifetime of `cache_type` as a [`Duration`].
    pub fn lifetime(&self, cache_type: &str) -> Duration {
        minutes(self.get_lifetime(cache_type))
    }

    /// Whether caching is on; evaluated afresh on every call.
    pub fn is_cache_enabled(&self) -> bool {
        effective_enabled(self.caching, self.debug)
    }
}

pub(crate) fn minutes(m: u64) -> Duration {
    Duration::from_secs(m.saturating_mul(60))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(base: u64) -> LifetimeResolver {
        LifetimeResolver::new(&CacheSettings::default().with_cache_time(base))
    }

    #[test]
    fn test_item_lifetime() {
        assert_eq!(resolver(15).get_lifetime("item"), 360);
    }

    #[test]
    fn test_unknown_type_uses_default_multiplier() {
        let r = resolver(15);
        assert_eq!(r.get_lifetime("unknown-type"), 60);
        assert_eq!(r.get_lifetime(""), 15 * DEFAULT_MULTIPLIER);
    }

    #[test]
    fn test_known_multipliers() {
        let r = resolver(10);
        assert_eq!(r.get_lifetime("list"), 80);
        assert_eq!(r.get_lifetime("category"), 480);
        assert_eq!(r.get_lifetime("count"), 80);
        assert_eq!(r.get_lifetime("search"), 10);
    }

    #[test]
    fn test_lifetime_as_duration() {
        assert_eq!(resolver(15).lifetime("item"), Duration::from_secs(360 * 60));
    }

    #[test]
    fn test_lifetime_saturates() {
        assert_eq!(resolver(u64::MAX).get_lifetime("item"), u64::MAX);
    }

    #[test]
    fn test_debug_disables_cache() {
        let settings = CacheSettings::default().with_caching(true).with_debug(true);
        assert!(!LifetimeResolver::new(&settings).is_cache_enabled());

        let settings = CacheSettings::default().with_caching(false).with_debug(true);
        assert!(!LifetimeResolver::new(&settings).is_cache_enabled());
    }

    #[test]
    fn test_enabled_follows_config_without_debug() {
        let on = CacheSettings::default().with_caching(true);
        let off = CacheSettings::default().with_caching(false);
        assert!(LifetimeResolver::new(&on).is_cache_enabled());
        assert!(!LifetimeResolver::new(&off).is_cache_enabled());
    }
}
