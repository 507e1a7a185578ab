//! # Stowage Cache
//!
//! Read-through caching for extensions embedded in a host application.
//!
//! This crate provides:
//! - Cache key generation from a type tag, an identifier and parameters
//! - Per-type lifetimes derived from the configured base lifetime
//! - File, Redis, memory and null storage backends
//! - A fail-open facade (`get`, `remove`, `clean`) over the backends
//! - A per-extension service and invalidation helpers for write paths
//!
//! Everything is synchronous. A call blocks until the backend answers.
//!
//! # Example
//!
//! ```ignore
//! use stowage_cache::{CacheParams, CacheService, Identifier};
//! use stowage_config::CacheSettings;
//!
//! let settings = CacheSettings::from_env();
//! let cache = CacheService::new(&settings, "com_articles");
//!
//! let article = cache
//!     .remember("item", Some(&Identifier::from(42)), &CacheParams::new(), || load_article(42))
//!     .into_inner();
//!
//! // After a write
//! stowage_cache::invalidate::entity(Some(&cache), "item", Some(&Identifier::from(42)), &["list"]);
//! ```

pub mod backend;
pub mod error;
pub mod facade;
pub mod invalidate;
pub mod keys;
pub mod lifetime;
pub mod service;

pub use backend::{CacheBackend, CleanMode, FileBackend, MemoryBackend, NullBackend, RedisBackend};
pub use error::{CacheError, Result};
pub use facade::{CacheFacade, CacheOutcome, CacheStats, CacheStatus};
pub use keys::{CacheParams, Identifier, KeyBuilder, hash_params, params_from};
pub use lifetime::LifetimeResolver;
pub use service::CacheService;
