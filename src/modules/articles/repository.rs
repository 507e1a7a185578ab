//! In-memory article storage.
//!
//! Stands in for the host application's database. Every read is counted so
//! callers can tell whether a value came from the cache or from storage.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use super::error::ArticleError;
use super::model::{Article, ArticleFilters, NewArticle};

#[derive(Debug)]
pub struct ArticleRepository {
    articles: RwLock<BTreeMap<u64, Article>>,
    next_id: AtomicU64,
    queries: AtomicUsize,
}

impl Default for ArticleRepository {
    fn default() -> Self {
        Self {
            articles: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            queries: AtomicUsize::new(0),
        }
    }
}

impl ArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of read queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<u64, Article>>, ArticleError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.articles
            .read()
            .map_err(|_| ArticleError::Storage("article store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<u64, Article>>, ArticleError> {
        self.articles
            .write()
            .map_err(|_| ArticleError::Storage("article store lock poisoned".into()))
    }

    pub fn find(&self, id: u64) -> Result<Option<Article>, ArticleError> {
        Ok(self.read()?.get(&id).cloned())
    }

    pub fn list(&self, filters: &ArticleFilters) -> Result<Vec<Article>, ArticleError> {
        let articles = self.read()?;
        let found: Vec<Article> = articles
            .values()
            .filter(|a| filters.matches(a))
            .cloned()
            .collect();

        debug!(returned = %found.len(), "Listed articles");
        Ok(found)
    }

    pub fn count(&self, filters: &ArticleFilters) -> Result<usize, ArticleError> {
        Ok(self.read()?.values().filter(|a| filters.matches(a)).count())
    }

    pub fn insert(&self, new: NewArticle) -> Result<Article, ArticleError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let article = Article {
            id,
            title: new.title,
            body: new.body,
            category: new.category,
            published: new.published,
        };
        self.write()?.insert(id, article.clone());
        Ok(article)
    }

    /// Replaces the article's fields. Returns `None` when `id` does not exist.
    pub fn update(&self, id: u64, changes: NewArticle) -> Result<Option<Article>, ArticleError> {
        let mut articles = self.write()?;
        let Some(article) = articles.get_mut(&id) else {
            return Ok(None);
        };

        article.title = changes.title;
        article.body = changes.body;
        article.category = changes.category;
        article.published = changes.published;

        Ok(Some(article.clone()))
    }

    pub fn delete(&self, id: u64) -> Result<bool, ArticleError> {
        Ok(self.write()?.remove(&id).is_some())
    }
}
