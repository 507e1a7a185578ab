//! Cache key generation utilities.
//!
//! Provides consistent cache key generation across extensions. A key is laid
//! out as `{prefix}:{type}[:{identifier}][:{params_hash}]`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Longest accepted group name.
pub const MAX_GROUP_LEN: usize = 128;

/// Query parameters folded into a cache key.
///
/// Ordered so that insertion order never changes the key.
pub type CacheParams = BTreeMap<String, Value>;

/// Identifier of the entity a key refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Text(String),
    Int(i64),
    UInt(u64),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Identifier {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i32> for Identifier {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<i64> for Identifier {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u32> for Identifier {
    fn from(n: u32) -> Self {
        Self::UInt(n.into())
    }
}

impl From<u64> for Identifier {
    fn from(n: u64) -> Self {
        Self::UInt(n)
    }
}

/// Builds cache keys under a fixed prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    prefix: String,
}

impl KeyBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Builds the key for `(cache_type, identifier, params)`.
    ///
    /// Pure: the same inputs always give the same key. Empty `params` add no
    /// hash segment.
    pub fn generate_key(
        &self,
        cache_type: &str,
        identifier: Option<&Identifier>,
        params: &CacheParams,
    ) -> String {
        let mut parts: Vec<String> = vec![cache_type.to_string()];
        if let Some(id) = identifier {
            parts.push(id.to_string());
        }
        if let Some(hash) = hash_params(params) {
            parts.push(hash);
        }
        format!("{}:{}", self.prefix, parts.join(":"))
    }
}

/// Hashes parameters into a key segment.
///
/// SHA-256 over a canonical JSON rendering in which object keys are sorted at
/// every depth. Returns `None` for empty parameters.
pub fn hash_params(params: &CacheParams) -> Option<String> {
    if params.is_empty() {
        return None;
    }

    let mut canonical = String::new();
    canonical.push('{');
    for (i, (name, value)) in params.iter().enumerate() {
        if i > 0 {
            canonical.push(',');
        }
        write_json_string(name, &mut canonical);
        canonical.push(':');
        write_canonical(value, &mut canonical);
    }
    canonical.push('}');

    let digest = Sha256::digest(canonical.as_bytes());
    Some(hex::encode(digest))
}

/// Converts a serializable filter struct into key parameters.
///
/// `null` fields are dropped, so a filter with nothing set yields empty
/// parameters.
pub fn params_from<T: Serialize>(filters: &T) -> Result<CacheParams> {
    match serde_json::to_value(filters)? {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        Value::Null => Ok(CacheParams::new()),
        _ => Err(CacheError::InvalidParams),
    }
}

/// Checks that a group name is safe as a directory name and a Redis pattern.
pub fn validate_group(group: &str) -> Result<()> {
    let invalid = |reason| CacheError::InvalidGroup {
        group: group.to_string(),
        reason,
    };

    if group.is_empty() {
        return Err(invalid("group cannot be empty"));
    }
    if group.starts_with('.') {
        return Err(invalid("group cannot start with '.'"));
    }
    if group.len() > MAX_GROUP_LEN {
        return Err(invalid("group is longer than 128 characters"));
    }
    if !group
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("only ASCII letters, digits, '_', '-' and '.' are allowed"));
    }

    Ok(())
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, inner)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(name, out);
                out.push(':');
                write_canonical(inner, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_json_string(s: &str, out: &mut String) {
    out.push_str(&Value::String(s.to_string()).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn builder() -> KeyBuilder {
        KeyBuilder::new("stowage")
    }

    fn params(pairs: &[(&str, Value)]) -> CacheParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_key_without_identifier_or_params() {
        let key = builder().generate_key("list", None, &CacheParams::new());
        assert_eq!(key, "stowage:list");
    }

    #[test]
    fn test_key_with_identifier() {
        let id = Identifier::from(42);
        let key = builder().generate_key("item", Some(&id), &CacheParams::new());
        assert_eq!(key, "stowage:item:42");
    }

    #[test]
    fn test_key_with_params_appends_sha256_hex() {
        let key = builder().generate_key("list", None, &params(&[("page", json!(2))]));
        let hash = key.strip_prefix("stowage:list:").unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_is_deterministic() {
        let id = Identifier::from("intro");
        let p = params(&[("lang", json!("en")), ("page", json!(1))]);
        assert_eq!(
            builder().generate_key("item", Some(&id), &p),
            builder().generate_key("item", Some(&id), &p)
        );
    }

    #[test]
    fn test_param_order_does_not_matter() {
        let mut first = CacheParams::new();
        first.insert("a".into(), json!(1));
        first.insert("b".into(), json!(2));

        let mut second = CacheParams::new();
        second.insert("b".into(), json!(2));
        second.insert("a".into(), json!(1));

        assert_eq!(
            builder().generate_key("list", None, &first),
            builder().generate_key("list", None, &second)
        );
    }

    #[test]
    fn test_nested_object_order_does_not_matter() {
        let mut inner_a = serde_json::Map::new();
        inner_a.insert("x".into(), json!(1));
        inner_a.insert("y".into(), json!([1, 2]));
        let mut inner_b = serde_json::Map::new();
        inner_b.insert("y".into(), json!([1, 2]));
        inner_b.insert("x".into(), json!(1));

        let first = params(&[("filter", Value::Object(inner_a))]);
        let second = params(&[("filter", Value::Object(inner_b))]);
        assert_eq!(hash_params(&first), hash_params(&second));
    }

    #[test]
    fn test_distinct_inputs_give_distinct_keys() {
        let b = builder();
        let none = CacheParams::new();
        let one = Identifier::from(1);
        let two = Identifier::from(2);

        assert_ne!(
            b.generate_key("item", Some(&one), &none),
            b.generate_key("item", Some(&two), &none)
        );
        assert_ne!(
            b.generate_key("item", Some(&one), &none),
            b.generate_key("list", Some(&one), &none)
        );
        assert_ne!(
            b.generate_key("list", None, &params(&[("page", json!(1))])),
            b.generate_key("list", None, &params(&[("page", json!(2))]))
        );
        assert_ne!(
            hash_params(&params(&[("page", json!(1))])),
            hash_params(&params(&[("page", json!("1"))]))
        );
    }

    #[test]
    fn test_empty_params_have_no_hash() {
        assert_eq!(hash_params(&CacheParams::new()), None);
    }

    #[test]
    fn test_params_from_drops_nulls() {
        #[derive(Serialize)]
        struct Filters {
            category: Option<String>,
            published: Option<bool>,
        }

        let empty = params_from(&Filters {
            category: None,
            published: None,
        })
        .unwrap();
        assert!(empty.is_empty());

        let set = params_from(&Filters {
            category: Some("news".into()),
            published: None,
        })
        .unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set["category"], json!("news"));
    }

    #[test]
    fn test_params_from_rejects_non_objects() {
        assert!(matches!(params_from(&[1, 2, 3]), Err(CacheError::InvalidParams)));
    }

    #[test]
    fn test_validate_group() {
        assert!(validate_group("com_articles.list").is_ok());
        assert!(validate_group("").is_err());
        assert!(validate_group("a:b").is_err());
        assert!(validate_group("../etc").is_err());
        assert!(validate_group("..").is_err());
        assert!(validate_group("glob*").is_err());
        assert!(validate_group(&"g".repeat(MAX_GROUP_LEN + 1)).is_err());
    }
}
