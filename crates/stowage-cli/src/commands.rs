//! Command implementations shared by the binary and its tests.

use anyhow::{Context, Result, bail};
use serde_json::Value;
use stowage_cache::{
    CacheParams, CacheService, CleanMode, Identifier, KeyBuilder, LifetimeResolver,
};
use stowage_config::CacheSettings;

/// One `name: value` line of the status report.
pub type StatusLine = (&'static str, String);

pub fn status(settings: &CacheSettings) -> Vec<StatusLine> {
    vec![
        ("caching", settings.caching.to_string()),
        ("debug", settings.debug.to_string()),
        ("enabled", settings.is_enabled().to_string()),
        ("handler", settings.cache_handler.to_string()),
        ("cache_time", format!("{} min", settings.cache_time)),
        ("key_prefix", settings.key_prefix.clone()),
        ("cache_path", settings.cache_path.display().to_string()),
        ("redis_url", settings.redis_url.clone()),
    ]
}

/// Parses a `name=value` argument. The value is read as JSON when it parses
/// and kept as a plain string otherwise.
pub fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (name, value) = raw
        .split_once('=')
        .with_context(|| format!("Parameter '{raw}' must look like name=value"))?;

    let name = name.trim();
    if name.is_empty() {
        bail!("Parameter '{raw}' has an empty name");
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((name.to_string(), value))
}

pub fn parse_params(raw: &[String]) -> Result<CacheParams> {
    raw.iter().map(|p| parse_param(p)).collect()
}

/// Builds the key `CacheService` would use for the namespace.
pub fn build_key(
    settings: &CacheSettings,
    namespace: &str,
    cache_type: &str,
    id: Option<&str>,
    params: &[String],
) -> Result<String> {
    let params = parse_params(params)?;
    let builder = KeyBuilder::new(settings.prefixed_key(namespace));
    let id = id.map(Identifier::from);

    Ok(builder.generate_key(cache_type, id.as_ref(), &params))
}

pub fn lifetime(settings: &CacheSettings, cache_type: &str) -> u64 {
    LifetimeResolver::new(settings).get_lifetime(cache_type)
}

/// Removes one entry. Without `group` the group is derived from the key's
/// type segment, so keys printed by `key` can be removed as they are.
pub fn remove(
    settings: &CacheSettings,
    namespace: &str,
    key: &str,
    group: Option<&str>,
) -> Result<bool> {
    let cache = CacheService::new(settings, namespace);
    let group = match group {
        Some(group) => group.to_string(),
        None => cache.group_for_key(key).with_context(|| {
            format!("Key '{key}' is not in namespace '{namespace}'; pass --group")
        })?,
    };

    Ok(cache.remove(key, Some(&group)))
}

/// Cleans `group` in the given mode, or every group of the namespace when
/// no group is given.
pub fn clean(
    settings: &CacheSettings,
    namespace: &str,
    group: Option<&str>,
    mode: CleanMode,
) -> bool {
    let cache = CacheService::new(settings, namespace);
    match group {
        Some(group) => cache.clean(Some(group), mode),
        None => cache.flush_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use stowage_cache::{CacheBackend, FileBackend};
    use stowage_config::CacheHandler;
    use tempfile::TempDir;

    fn file_settings(dir: &TempDir) -> CacheSettings {
        CacheSettings::default()
            .with_caching(true)
            .with_handler(CacheHandler::File)
            .with_cache_path(dir.path())
    }

    #[test]
    fn test_parse_param_json_and_string() {
        assert_eq!(parse_param("page=2").unwrap(), ("page".into(), json!(2)));
        assert_eq!(
            parse_param("published=true").unwrap(),
            ("published".into(), json!(true))
        );
        assert_eq!(
            parse_param("category=news").unwrap(),
            ("category".into(), json!("news"))
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".into(), json!("a=b"))
        );
    }

    #[test]
    fn test_parse_param_rejects_malformed() {
        assert!(parse_param("page").is_err());
        assert!(parse_param("=2").is_err());
    }

    #[test]
    fn test_build_key_ignores_param_order() {
        let settings = CacheSettings::default();
        let a = build_key(
            &settings,
            "com_articles",
            "list",
            None,
            &["page=1".into(), "category=news".into()],
        )
        .unwrap();
        let b = build_key(
            &settings,
            "com_articles",
            "list",
            None,
            &["category=news".into(), "page=1".into()],
        )
        .unwrap();

        assert_eq!(a, b);
        assert!(a.starts_with("stowage:com_articles:list:"));
    }

    #[test]
    fn test_build_key_with_id() {
        let settings = CacheSettings::default();
        let key = build_key(&settings, "com_articles", "item", Some("42"), &[]).unwrap();
        assert_eq!(key, "stowage:com_articles:item:42");
    }

    #[test]
    fn test_lifetime_uses_settings() {
        let settings = CacheSettings::default().with_cache_time(15);
        assert_eq!(lifetime(&settings, "item"), 360);
        assert_eq!(lifetime(&settings, "search"), 15);
        assert_eq!(lifetime(&settings, "whatever"), 60);
    }

    #[test]
    fn test_status_reports_handler() {
        let settings = CacheSettings::default().with_handler(CacheHandler::Memory);
        let lines = status(&settings);
        assert!(lines.contains(&("handler", "memory".to_string())));
    }

    #[test]
    fn test_remove_and_clean_against_file_backend() {
        let dir = TempDir::new().unwrap();
        let settings = file_settings(&dir);
        let backend = FileBackend::new(dir.path()).unwrap();
        let ttl = Duration::from_secs(60);
        backend.store("com_articles.item", "a", "1", ttl).unwrap();
        backend.store("com_articles.list", "b", "2", ttl).unwrap();
        backend.store("com_users.item", "c", "3", ttl).unwrap();

        assert!(remove(&settings, "com_articles", "a", Some("com_articles.item")).unwrap());
        assert!(backend.get("com_articles.item", "a").unwrap().is_none());

        assert!(clean(&settings, "com_articles", Some("com_articles."), CleanMode::Prefix));
        assert!(backend.get("com_articles.list", "b").unwrap().is_none());
        assert!(backend.get("com_users.item", "c").unwrap().is_some());
    }

    #[test]
    fn test_remove_without_group_uses_key_type() {
        let dir = TempDir::new().unwrap();
        let settings = file_settings(&dir);
        let service = CacheService::new(&settings, "com_articles");
        let id = Identifier::from(42);
        service.remember("item", Some(&id), &CacheParams::new(), || 1);

        let key = build_key(&settings, "com_articles", "item", Some("42"), &[]).unwrap();
        assert!(remove(&settings, "com_articles", &key, None).unwrap());

        let again = service.remember("item", Some(&id), &CacheParams::new(), || 2);
        assert_eq!(again.value, 2);
    }

    #[test]
    fn test_remove_without_group_rejects_foreign_key() {
        let dir = TempDir::new().unwrap();
        let settings = file_settings(&dir);
        assert!(remove(&settings, "com_articles", "stowage:com_users:item:1", None).is_err());
    }

    #[test]
    fn test_clean_without_group_flushes_namespace() {
        let dir = TempDir::new().unwrap();
        let settings = file_settings(&dir);
        let service = CacheService::new(&settings, "com_articles");
        let other = CacheService::new(&settings, "com_users");
        let id = Identifier::from(42);
        service.remember("item", Some(&id), &CacheParams::new(), || 1);
        service.remember("list", None, &CacheParams::new(), || vec![1]);
        other.remember("item", Some(&id), &CacheParams::new(), || 7);

        assert!(clean(&settings, "com_articles", None, CleanMode::Group));

        assert!(!service.remember("item", Some(&id), &CacheParams::new(), || 0).is_hit());
        assert!(!service.remember("list", None, &CacheParams::new(), Vec::<i32>::new).is_hit());
        assert!(other.remember("item", Some(&id), &CacheParams::new(), || 0).is_hit());
    }
}
