//! # Stowage
//!
//! An example extension built on the Stowage caching crates.
//!
//! ## Overview
//!
//! The `articles` module shows the intended use of the cache inside an
//! extension:
//!
//! - **Reads** go through [`stowage_cache::CacheService::try_remember`] with a
//!   type tag (`item`, `list`, `count`), so each kind gets its own lifetime
//! - **Filters** become cache parameters, giving each filter combination its
//!   own entry
//! - **Writes** call [`stowage_cache::invalidate::entity`] so no stale item or
//!   list survives a change
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── stowage-config/         # CacheSettings, CacheHandler
//! ├── stowage-cache/          # keys, lifetimes, backends, facade, service
//! ├── stowage-observability/  # tracing subscriber setup
//! └── stowage-cli/            # cache inspection CLI
//! src/
//! ├── modules/articles/       # model, repository, cached service
//! └── state.rs                # settings -> cache -> services
//! ```
//!
//! ## Environment Variables
//!
//! ```bash
//! CACHING=1
//! CACHE_TIME=15
//! CACHE_HANDLER=file          # file | redis | memory | none
//! CACHE_PATH=storage/cache
//! REDIS_URL=redis://127.0.0.1:6379
//! DEBUG=0                     # debug mode disables cache reads
//! ```

pub mod modules;
pub mod state;

// Re-export workspace crates for convenience
pub use stowage_cache;
pub use stowage_config;
pub use stowage_observability;
