pub mod articles;

pub use self::articles::model::{Article, ArticleFilters, NewArticle};
