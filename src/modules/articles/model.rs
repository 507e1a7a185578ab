use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewArticle {
    #[validate(length(min = 1, max = 255, message = "title must be 1 to 255 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "body must not be empty"))]
    pub body: String,
    pub category: Option<String>,
    #[serde(default)]
    pub published: bool,
}

/// Listing filters. Every field that is set narrows the result and becomes
/// part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleFilters {
    pub category: Option<String>,
    pub published: Option<bool>,
    /// Case-insensitive substring of the title or body
    pub search: Option<String>,
}

impl ArticleFilters {
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(category) = &self.category
            && article.category.as_ref() != Some(category)
        {
            return false;
        }

        if let Some(published) = self.published
            && article.published != published
        {
            return false;
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            return article.title.to_lowercase().contains(&needle)
                || article.body.to_lowercase().contains(&needle);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article() -> Article {
        Article {
            id: 1,
            title: "Rust Caching".into(),
            body: "Read-through caches in practice".into(),
            category: Some("tech".into()),
            published: true,
        }
    }

    #[test]
    fn test_empty_filters_match_everything() {
        assert!(ArticleFilters::default().matches(&article()));
    }

    #[test]
    fn test_filters_narrow() {
        let a = article();
        let by_category = ArticleFilters {
            category: Some("news".into()),
            ..Default::default()
        };
        assert!(!by_category.matches(&a));

        let unpublished = ArticleFilters {
            published: Some(false),
            ..Default::default()
        };
        assert!(!unpublished.matches(&a));

        let search = ArticleFilters {
            search: Some("CACHES".into()),
            ..Default::default()
        };
        assert!(search.matches(&a));
    }

    #[test]
    fn test_new_article_validation() {
        let valid = NewArticle {
            title: "Hello".into(),
            body: "World".into(),
            category: None,
            published: false,
        };
        assert!(valid.validate().is_ok());

        let empty_title = NewArticle {
            title: String::new(),
            ..valid.clone()
        };
        assert!(empty_title.validate().is_err());

        let long_title = NewArticle {
            title: "x".repeat(256),
            ..valid.clone()
        };
        assert!(long_title.validate().is_err());

        let empty_body = NewArticle {
            body: String::new(),
            ..valid
        };
        let errors = empty_body.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("body"));
    }
}
