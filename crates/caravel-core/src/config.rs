//! Merged application configuration.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding process settings applied at setup.
pub const INI_SET_KEY: &str = "ini.set";

/// Flat key/value configuration.
///
/// Keys are free-form; package-scoped keys start with the package name
/// (`"BlogPackage.title"`). Merging keeps the first insertion position of a
/// key while later values win.
///
/// # Example
///
/// ```
/// use caravel_core::Config;
/// use serde_json::json;
///
/// let mut config = Config::from_value(&json!({"BlogPackage.title": "Blog", "debug": false}));
/// config.merge(Config::from_value(&json!({"debug": true})));
///
/// assert_eq!(config.get_str("BlogPackage.title"), Some("Blog"));
/// assert_eq!(config.get("debug"), Some(&json!(true)));
/// assert_eq!(config.scoped("blogpackage").len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    values: IndexMap<String, Value>,
}

impl Config {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a JSON object; anything else is empty.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Self::new(),
        }
    }

    /// Returns the configuration as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<Map<String, Value>>(),
        )
    }

    /// Returns a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns a string value by key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns a boolean value by key.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Returns an integer value by key.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    /// Sets a value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Merges `other` over `self`.
    pub fn merge(&mut self, other: Config) {
        self.values.extend(other.values);
    }

    /// Keys that start with `prefix`, compared case-insensitively.
    #[must_use]
    pub fn scoped(&self, prefix: &str) -> Config {
        let prefix = prefix.to_lowercase();
        self.values
            .iter()
            .filter(|(key, _)| key.to_lowercase().starts_with(&prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// The `ini.set` block, as a flat `"ini.set"` key or a nested
    /// `ini = { set = ... }` table.
    #[must_use]
    pub fn ini_settings(&self) -> Option<&Map<String, Value>> {
        self.get(INI_SET_KEY)
            .or_else(|| self.get("ini").and_then(|ini| ini.get("set")))
            .and_then(Value::as_object)
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for Config {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
