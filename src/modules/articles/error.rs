use stowage_cache::CacheError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum ArticleError {
    #[error("Article {0} not found")]
    NotFound(u64),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
