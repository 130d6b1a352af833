//! Reverse routing and its memo table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::RouteTable;

/// Memo key: route name plus the serialized parameter list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct UrlKey {
    name: String,
    params: String,
}

impl UrlKey {
    fn new(name: &str, params: &[(&str, Value)]) -> Self {
        let serialized = Value::Array(
            params
                .iter()
                .map(|(k, v)| Value::Array(vec![Value::String((*k).to_string()), v.clone()]))
                .collect(),
        );
        Self {
            name: name.to_string(),
            params: serialized.to_string(),
        }
    }
}

/// Memo table statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlCacheStats {
    /// Lookups answered from the memo table.
    pub hits: u64,
    /// Lookups that had to resolve the route.
    pub misses: u64,
    /// Number of memoized URLs.
    pub size: usize,
}

/// Memoized `url_for` results.
///
/// Entries are never invalidated; a route table is immutable once loaded,
/// so a resolved URL stays valid for the lifetime of the table.
#[derive(Debug, Default)]
pub struct UrlResolutionCache {
    resolved: RwLock<HashMap<UrlKey, String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl UrlResolutionCache {
    /// Creates an empty memo table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a named route against `routes`, memoizing the result.
    pub fn resolve(&self, routes: &RouteTable, name: &str, params: &[(&str, Value)]) -> String {
        let key = UrlKey::new(name, params);
        if let Some(url) = self.resolved.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return url.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let url = build_url(routes, name, params);
        self.resolved.write().insert(key, url.clone());
        url
    }

    /// Returns hit/miss counters and the current size.
    pub fn stats(&self) -> UrlCacheStats {
        UrlCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: self.resolved.read().len(),
        }
    }
}

/// Substitutes `{name}` placeholders in a route path.
///
/// Unknown or invalid route names resolve to the name itself. Only string
/// and integer values are substituted; anything else leaves its placeholder
/// untouched.
pub fn build_url(routes: &RouteTable, name: &str, params: &[(&str, Value)]) -> String {
    let Some(route) = routes.get(name) else {
        return name.to_string();
    };

    let mut url = route.path().to_string();
    for (key, value) in params {
        let replacement = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            _ => continue,
        };
        url = url.replace(&format!("{{{key}}}"), &replacement);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table() -> RouteTable {
        RouteTable::from_value(&json!({
            "index_name_not_same": {"path": "/somewhere/{name}"},
            "pair": {"path": "/{a}/{b}/{a}"},
            "broken": {"view.directRender": 1},
        }))
    }

    #[test]
    fn test_substitutes_string_and_int() {
        let routes = table();
        assert_eq!(
            build_url(&routes, "index_name_not_same", &[("name", json!("foobar"))]),
            "/somewhere/foobar"
        );
        assert_eq!(
            build_url(&routes, "pair", &[("a", json!(1)), ("b", json!("x"))]),
            "/1/x/1"
        );
    }

    #[test]
    fn test_skips_other_value_types() {
        let routes = table();
        assert_eq!(
            build_url(&routes, "pair", &[("a", json!(1.5)), ("b", json!(true))]),
            "/{a}/{b}/{a}"
        );
        assert_eq!(
            build_url(&routes, "pair", &[("a", json!(null)), ("b", json!(["x"]))]),
            "/{a}/{b}/{a}"
        );
    }

    #[test]
    fn test_unknown_and_invalid_names_degrade() {
        let routes = table();
        assert_eq!(build_url(&routes, "missing_path", &[]), "missing_path");
        assert_eq!(build_url(&routes, "broken", &[]), "broken");
    }

    #[test]
    fn test_memoizes() {
        let routes = table();
        let cache = UrlResolutionCache::new();
        let params = [("name", json!("foobar"))];

        let first = cache.resolve(&routes, "index_name_not_same", &params);
        let second = cache.resolve(&routes, "index_name_not_same", &params);
        assert_eq!(first, second);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_distinct_params_distinct_entries() {
        let routes = table();
        let cache = UrlResolutionCache::new();
        let a = cache.resolve(&routes, "index_name_not_same", &[("name", json!("a"))]);
        let b = cache.resolve(&routes, "index_name_not_same", &[("name", json!("b"))]);
        assert_ne!(a, b);
        assert_eq!(cache.stats().size, 2);
    }
}
