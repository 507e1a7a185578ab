use fake::Fake;
use fake::faker::lorem::en::{Paragraph, Sentence};
use stowage::modules::NewArticle;
use stowage_config::{CacheHandler, CacheSettings};
use tempfile::TempDir;

/// Settings for a file-backed cache rooted in `dir`.
#[allow(dead_code)]
pub fn file_settings(dir: &TempDir) -> CacheSettings {
    CacheSettings::default()
        .with_caching(true)
        .with_handler(CacheHandler::File)
        .with_cache_path(dir.path().join("cache"))
}

#[allow(dead_code)]
pub fn fake_article(category: &str) -> NewArticle {
    NewArticle {
        title: Sentence(2..6).fake(),
        body: Paragraph(1..3).fake(),
        category: Some(category.to_string()),
        published: true,
    }
}
