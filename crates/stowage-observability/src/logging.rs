use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Logging options read from the environment.
///
/// - `LOG_LEVEL`: level for Stowage crates (default: `info`)
/// - `LOG_DIR`: directory for daily JSON log files (default: unset, console only)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: std::env::var("LOG_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Filter directives used when `RUST_LOG` is not set.
    pub fn directives(&self) -> String {
        format!(
            "stowage={level},stowage_config={level},stowage_cache={level},\
             stowage_observability={level},stowage_cli={level},redis=warn",
            level = self.level
        )
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// Initialize console logging only.
///
/// - **Log Level**: Controlled by `LOG_LEVEL` (default: "info"), overridden by `RUST_LOG`
/// - **Format**: Compact, with module paths and source locations
/// - **Writer**: stderr, so command output on stdout stays clean
pub fn init_basic_console_logging() {
    let config = LoggingConfig {
        log_dir: None,
        ..LoggingConfig::from_env()
    };
    init_logging(&config);
}

/// Initialize console logging plus, when `log_dir` is set, a daily-rolling
/// JSON log file.
///
/// Keep the returned guard alive for as long as file logs should be written;
/// dropping it flushes and stops the background writer.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.directives()));

    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (json_layer, guard) = match &config.log_dir {
        Some(dir) => match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("stowage")
            .filename_suffix("json")
            .build(dir)
        {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(EnvFilter::new(config.directives()));
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log directory {}: {}. Continuing with console logging only...",
                    dir.display(),
                    e
                );
                (None, None)
            }
        },
        None => (None, None),
    };

    if let Err(e) = tracing_subscriber::registry()
        .with(console_layer)
        .with(json_layer)
        .try_init()
    {
        eprintln!("Logging was already initialized: {e}");
    }

    guard
}
