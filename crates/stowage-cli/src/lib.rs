//! # Stowage CLI
//!
//! Cache inspection and invalidation for Stowage deployments.
//!
//! This library crate holds the argument definitions and command
//! implementations used by the `stowage-cli` binary.
//!
//! ## Usage
//!
//! ```ignore
//! use stowage_cli::commands;
//! use stowage_config::CacheSettings;
//!
//! let settings = CacheSettings::from_env();
//! let key = commands::build_key(&settings, "com_articles", "item", Some("42"), &[])?;
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ModeArg};
