use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage backend selected by the `CACHE_HANDLER` setting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheHandler {
    /// JSON files under `CACHE_PATH`.
    #[default]
    File,
    /// A Redis server at `REDIS_URL`.
    Redis,
    /// Process-local memory, lost on exit.
    Memory,
    /// Stores nothing.
    None,
}

impl CacheHandler {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Redis => "redis",
            Self::Memory => "memory",
            Self::None => "none",
        }
    }
}

impl fmt::Display for CacheHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown cache handler '{0}' (expected file, redis, memory or none)")]
pub struct UnknownHandler(pub String);

impl FromStr for CacheHandler {
    type Err = UnknownHandler;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "null" => Ok(Self::None),
            _ => Err(UnknownHandler(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Redis".parse::<CacheHandler>(), Ok(CacheHandler::Redis));
        assert_eq!(" FILE ".parse::<CacheHandler>(), Ok(CacheHandler::File));
        assert_eq!("null".parse::<CacheHandler>(), Ok(CacheHandler::None));
    }

    #[test]
    fn test_parse_unknown_handler() {
        let err = "memcached".parse::<CacheHandler>().unwrap_err();
        assert_eq!(err, UnknownHandler("memcached".into()));
        assert!(err.to_string().contains("memcached"));
    }

    #[test]
    fn test_display_round_trips_canonical_name() {
        for handler in [
            CacheHandler::File,
            CacheHandler::Redis,
            CacheHandler::Memory,
            CacheHandler::None,
        ] {
            assert_eq!(handler.to_string().parse::<CacheHandler>(), Ok(handler));
        }
    }
}
