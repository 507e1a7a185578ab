use dotenvy::dotenv;
use stowage::modules::{ArticleFilters, NewArticle};
use stowage::state::init_app_state;
use stowage_observability::{LoggingConfig, init_logging};
use tracing::info;

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Keep the guard alive so file logs are flushed on exit
    let _guard = init_logging(&LoggingConfig::from_env());

    let state = init_app_state();
    let articles = &state.articles;

    let article = articles.create_article(NewArticle {
        title: "Caching extensions".into(),
        body: "Keys, lifetimes and a fail-open facade.".into(),
        category: Some("guides".into()),
        published: true,
    })?;

    for round in 1..=2 {
        let outcome = articles.get_article(article.id)?;
        info!(round, cache.status = ?outcome.status, "Read article");
    }

    let filters = ArticleFilters {
        published: Some(true),
        ..Default::default()
    };
    let listed = articles.list_articles(&filters)?;
    info!(cache.status = ?listed.status, returned = %listed.value.len(), "Listed articles");

    articles.update_article(
        article.id,
        NewArticle {
            title: "Caching extensions, revised".into(),
            body: article.body.clone(),
            category: article.category.clone(),
            published: true,
        },
    )?;

    let reread = articles.get_article(article.id)?;
    info!(
        cache.status = ?reread.status,
        article.title = %reread.value.title,
        "Read article after update"
    );

    if let Some(cache) = articles.cache() {
        let stats = cache.facade().stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            stores = stats.stores,
            degraded = stats.degraded,
            hit_ratio = stats.hit_ratio(),
            "Cache statistics"
        );
    }

    Ok(())
}
