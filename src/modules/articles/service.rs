use std::sync::Arc;

use stowage_cache::{
    CacheOutcome, CacheParams, CacheService, CacheStatus, Identifier, invalidate, params_from,
};
use tracing::{debug, info, instrument};
use validator::Validate;

use super::error::ArticleError;
use super::model::{Article, ArticleFilters, NewArticle};
use super::repository::ArticleRepository;

/// Cache namespace of the articles extension.
pub const NAMESPACE: &str = "com_articles";

const ITEM: &str = "item";
const LIST: &str = "list";
const COUNT: &str = "count";

/// Article reads go through the cache; writes invalidate it.
///
/// Without a cache every read goes straight to the repository and reports
/// [`CacheStatus::Disabled`].
#[derive(Debug)]
pub struct ArticleService {
    repo: Arc<ArticleRepository>,
    cache: Option<CacheService>,
}

impl ArticleService {
    pub fn new(repo: Arc<ArticleRepository>, cache: Option<CacheService>) -> Self {
        Self { repo, cache }
    }

    pub fn repository(&self) -> &ArticleRepository {
        &self.repo
    }

    pub fn cache(&self) -> Option<&CacheService> {
        self.cache.as_ref()
    }

    fn remember<T, F>(
        &self,
        cache_type: &str,
        id: Option<&Identifier>,
        params: &CacheParams,
        producer: F,
    ) -> Result<CacheOutcome<T>, ArticleError>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Result<T, ArticleError>,
    {
        match &self.cache {
            Some(cache) => cache.try_remember(cache_type, id, params, producer),
            None => Ok(CacheOutcome::new(producer()?, CacheStatus::Disabled)),
        }
    }

    #[instrument(skip(self), fields(article.id = %id))]
    pub fn get_article(&self, id: u64) -> Result<CacheOutcome<Article>, ArticleError> {
        let outcome = self.remember(ITEM, Some(&Identifier::from(id)), &CacheParams::new(), || {
            self.repo.find(id)?.ok_or(ArticleError::NotFound(id))
        })?;

        debug!(cache.status = ?outcome.status, "Article loaded");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn list_articles(
        &self,
        filters: &ArticleFilters,
    ) -> Result<CacheOutcome<Vec<Article>>, ArticleError> {
        let params = params_from(filters)?;
        let outcome = self.remember(LIST, None, &params, || self.repo.list(filters))?;

        debug!(
            cache.status = ?outcome.status,
            returned = %outcome.value.len(),
            "Articles listed"
        );
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub fn count_articles(
        &self,
        filters: &ArticleFilters,
    ) -> Result<CacheOutcome<usize>, ArticleError> {
        let params = params_from(filters)?;
        self.remember(COUNT, None, &params, || self.repo.count(filters))
    }

    #[instrument(skip(self, new), fields(article.title = %new.title))]
    pub fn create_article(&self, new: NewArticle) -> Result<Article, ArticleError> {
        new.validate()?;
        let article = self.repo.insert(new)?;

        // New article may appear in any list or count
        invalidate::entity(self.cache.as_ref(), ITEM, None, &[LIST, COUNT]);

        info!(article.id = %article.id, "Article created");
        Ok(article)
    }

    #[instrument(skip(self, changes), fields(article.id = %id))]
    pub fn update_article(&self, id: u64, changes: NewArticle) -> Result<Article, ArticleError> {
        changes.validate()?;
        let article = self
            .repo
            .update(id, changes)?
            .ok_or(ArticleError::NotFound(id))?;

        invalidate::entity(
            self.cache.as_ref(),
            ITEM,
            Some(&Identifier::from(id)),
            &[LIST, COUNT],
        );

        info!("Article updated");
        Ok(article)
    }

    #[instrument(skip(self), fields(article.id = %id))]
    pub fn delete_article(&self, id: u64) -> Result<(), ArticleError> {
        if !self.repo.delete(id)? {
            return Err(ArticleError::NotFound(id));
        }

        invalidate::entity(
            self.cache.as_ref(),
            ITEM,
            Some(&Identifier::from(id)),
            &[LIST, COUNT],
        );

        info!("Article deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_cache::MemoryBackend;
    use stowage_config::CacheSettings;

    fn service(caching: bool) -> ArticleService {
        let settings = CacheSettings::default().with_caching(caching);
        let cache = CacheService::with_backend(&settings, Arc::new(MemoryBackend::new()), NAMESPACE);
        ArticleService::new(Arc::new(ArticleRepository::new()), Some(cache))
    }

    fn new_article(title: &str) -> NewArticle {
        NewArticle {
            title: title.into(),
            body: "Body".into(),
            category: Some("news".into()),
            published: true,
        }
    }

    #[test]
    fn test_second_read_is_a_hit() {
        let service = service(true);
        let article = service.create_article(new_article("First")).unwrap();

        let first = service.get_article(article.id).unwrap();
        assert_eq!(first.status, CacheStatus::Stored);
        let second = service.get_article(article.id).unwrap();
        assert!(second.is_hit());
        assert_eq!(second.value, article);
        assert_eq!(service.repository().query_count(), 1);
    }

    #[test]
    fn test_missing_article_is_not_cached() {
        let service = service(true);
        assert!(matches!(
            service.get_article(7),
            Err(ArticleError::NotFound(7))
        ));
        assert!(service.get_article(7).is_err());
        assert_eq!(service.repository().query_count(), 2);
    }

    #[test]
    fn test_update_invalidates_item_and_lists() {
        let service = service(true);
        let article = service.create_article(new_article("Before")).unwrap();
        let filters = ArticleFilters::default();

        service.get_article(article.id).unwrap();
        service.list_articles(&filters).unwrap();
        service.count_articles(&filters).unwrap();

        service.update_article(article.id, new_article("After")).unwrap();

        let item = service.get_article(article.id).unwrap();
        assert_eq!(item.status, CacheStatus::Stored);
        assert_eq!(item.value.title, "After");

        let list = service.list_articles(&filters).unwrap();
        assert_eq!(list.status, CacheStatus::Stored);
        assert_eq!(list.value[0].title, "After");
    }

    #[test]
    fn test_create_invalidates_count() {
        let service = service(true);
        let filters = ArticleFilters::default();
        assert_eq!(service.count_articles(&filters).unwrap().value, 0);

        service.create_article(new_article("One")).unwrap();
        let count = service.count_articles(&filters).unwrap();
        assert_eq!(count.value, 1);
        assert_eq!(count.status, CacheStatus::Stored);
    }

    #[test]
    fn test_filters_get_separate_entries() {
        let service = service(true);
        service.create_article(new_article("Rust")).unwrap();
        let news = ArticleFilters {
            category: Some("news".into()),
            ..Default::default()
        };
        let tech = ArticleFilters {
            category: Some("tech".into()),
            ..Default::default()
        };

        assert_eq!(service.list_articles(&news).unwrap().value.len(), 1);
        assert!(service.list_articles(&tech).unwrap().value.is_empty());
        assert!(service.list_articles(&news).unwrap().is_hit());
    }

    #[test]
    fn test_disabled_cache_reads_through() {
        let service = service(false);
        let article = service.create_article(new_article("Uncached")).unwrap();

        let first = service.get_article(article.id).unwrap();
        let second = service.get_article(article.id).unwrap();
        assert_eq!(first.status, CacheStatus::Disabled);
        assert_eq!(second.status, CacheStatus::Disabled);
        assert_eq!(service.repository().query_count(), 2);
    }

    #[test]
    fn test_without_cache_service() {
        let service = ArticleService::new(Arc::new(ArticleRepository::new()), None);
        let article = service.create_article(new_article("Plain")).unwrap();
        assert_eq!(
            service.get_article(article.id).unwrap().status,
            CacheStatus::Disabled
        );
        service.delete_article(article.id).unwrap();
        assert!(matches!(
            service.delete_article(article.id),
            Err(ArticleError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_article_is_rejected() {
        let service = service(true);
        let invalid = NewArticle {
            title: String::new(),
            ..new_article("x")
        };
        assert!(matches!(
            service.create_article(invalid),
            Err(ArticleError::Validation(_))
        ));
    }
}
