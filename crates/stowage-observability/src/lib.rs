//! Stowage Observability Module
//!
//! Sets up `tracing` output for the Stowage binaries:
//! - Console logging filtered by `RUST_LOG` / `LOG_LEVEL`
//! - Optional daily-rolling JSON log files
//!
//! # Examples
//!
//! ```no_run
//! use stowage_observability::{LoggingConfig, init_logging};
//!
//! let _guard = init_logging(&LoggingConfig::from_env());
//! tracing::info!("ready");
//! ```

pub mod logging;

pub use logging::{LoggingConfig, init_basic_console_logging, init_logging};
