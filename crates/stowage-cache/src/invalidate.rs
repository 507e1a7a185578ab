//! Cache invalidation helpers for write paths.
//!
//! Call these after creating, updating or deleting an entity. They accept an
//! optional service so callers running without a cache need no branching.

use tracing::warn;

use crate::keys::Identifier;
use crate::service::CacheService;

/// Invalidate the caches of one entity.
///
/// Removes the entity's own entry of `item_type` (if `id` is given) and
/// flushes every group in `list_types`, since any list may contain it.
pub fn entity(
    cache: Option<&CacheService>,
    item_type: &str,
    id: Option<&Identifier>,
    list_types: &[&str],
) {
    let Some(cache) = cache else { return };

    // Invalidate specific entity if ID provided
    if let Some(id) = id {
        cache.forget(item_type, id);
    }

    // Always invalidate list caches
    for list_type in list_types {
        if !cache.flush_type(list_type) {
            warn!(
                cache.namespace = %cache.namespace(),
                cache.kind = %list_type,
                "Failed to invalidate list caches"
            );
        }
    }
}

/// Invalidate everything cached for the service's namespace.
pub fn namespace(cache: Option<&CacheService>) {
    let Some(cache) = cache else { return };

    if !cache.flush_all() {
        warn!(cache.namespace = %cache.namespace(), "Failed to invalidate namespace caches");
    }
}
