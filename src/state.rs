use std::sync::Arc;

use stowage_cache::CacheService;
use stowage_config::CacheSettings;
use tracing::info;

use crate::modules::articles::service::NAMESPACE;
use crate::modules::articles::{ArticleRepository, ArticleService};

#[derive(Debug)]
pub struct AppState {
    pub settings: CacheSettings,
    pub articles: ArticleService,
}

impl AppState {
    /// Wires the configured cache into the article service.
    pub fn from_settings(settings: CacheSettings) -> Self {
        let cache = CacheService::new(&settings, NAMESPACE);

        info!(
            cache.backend = %cache.facade().backend_name(),
            cache.enabled = %cache.is_cache_enabled(),
            cache.namespace = %NAMESPACE,
            "Cache initialized"
        );

        let articles = ArticleService::new(Arc::new(ArticleRepository::new()), Some(cache));
        Self { settings, articles }
    }
}

pub fn init_app_state() -> AppState {
    AppState::from_settings(CacheSettings::from_env())
}
