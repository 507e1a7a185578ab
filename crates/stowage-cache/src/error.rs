/// Error type for cache operations.
///
/// Backend failures never escape the facade. They are logged there and turned
/// into a degraded result.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid cache group '{group}': {reason}")]
    InvalidGroup { group: String, reason: &'static str },

    #[error("Cache parameters must serialize to a JSON object")]
    InvalidParams,

    #[error("Unknown clean mode '{0}' (expected group or prefix)")]
    InvalidCleanMode(String),
}

pub type Result<T, E = CacheError> = std::result::Result<T, E>;
