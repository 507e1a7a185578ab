//! # Stowage Config
//!
//! Configuration types for Stowage caching.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`cache`]: cache settings (lifetime, enabled flag, backend selector)
//! - [`handler`]: the cache backend selector
//!
//! Settings are read once by the embedding application and passed explicitly
//! into the cache facade. Nothing in the libraries reads the environment on
//! its own.
//!
//! # Example
//!
//! ```ignore
//! use stowage_config::CacheSettings;
//!
//! let settings = CacheSettings::from_env();
//! if settings.is_enabled() {
//!     // ...
//! }
//! ```

pub mod cache;
pub mod handler;

// Re-export commonly used types at crate root
pub use cache::{CacheSettings, effective_enabled, parse_flag};
pub use handler::{CacheHandler, UnknownHandler};
