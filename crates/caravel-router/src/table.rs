//! Ordered route tables.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::RouteDefinitionError;
use crate::RouteDefinition;

/// A named entry of a [`RouteTable`].
///
/// Keeps the source form next to the validation result so the table can be
/// cached verbatim and rebuilt identically.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    source: Value,
    route: Result<Arc<RouteDefinition>, RouteDefinitionError>,
}

impl RouteEntry {
    fn new(name: &str, source: Value) -> Self {
        let route = RouteDefinition::from_value(name, &source).map(Arc::new);
        if let Err(e) = &route {
            tracing::warn!(route = name, error = %e, "skipping malformed route");
        }
        Self { source, route }
    }

    /// The entry as declared.
    #[must_use]
    pub fn source(&self) -> &Value {
        &self.source
    }

    /// The validated route, or why it was rejected.
    pub fn route(&self) -> Result<&Arc<RouteDefinition>, &RouteDefinitionError> {
        self.route.as_ref()
    }

    /// Returns true if the entry passed validation.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.route.is_ok()
    }
}

/// Route definitions keyed by name, iterated in insertion order.
///
/// Insertion order is match precedence: the first route that accepts a
/// request wins. Re-inserting an existing name replaces the entry but keeps
/// its original position.
///
/// # Example
///
/// ```rust
/// use caravel_router::{RouteDefinition, RouteTable};
/// use serde_json::json;
///
/// let mut table = RouteTable::from_value(&json!({
///     "index": {"path": "/", "handler": "Index::index"},
///     "broken": {"method": "GET"},
/// }));
/// table.insert(RouteDefinition::new("about", "/about").handler("Index::about"));
///
/// assert_eq!(table.len(), 3);
/// assert_eq!(table.routes().count(), 2);
/// assert!(table.get("broken").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: IndexMap<String, RouteEntry>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from a source-form object of `name -> route`.
    ///
    /// Anything other than an object yields an empty table.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut table = Self::new();
        match value {
            Value::Object(routes) => {
                for (name, source) in routes {
                    table.insert_value(name.clone(), source.clone());
                }
            }
            Value::Null => {}
            other => {
                tracing::warn!(kind = value_kind(other), "route table must be an object");
            }
        }
        table
    }

    /// Adds or replaces an entry in source form.
    pub fn insert_value(&mut self, name: impl Into<String>, source: Value) {
        let name = name.into();
        let entry = RouteEntry::new(&name, source);
        self.entries.insert(name, entry);
    }

    /// Adds or replaces a validated route.
    pub fn insert(&mut self, route: RouteDefinition) {
        let name = route.name().to_string();
        let entry = RouteEntry {
            source: route.to_value(),
            route: Ok(Arc::new(route)),
        };
        self.entries.insert(name, entry);
    }

    /// Appends every entry of `other`; entries with an existing name replace it.
    pub fn extend(&mut self, other: RouteTable) {
        self.entries.extend(other.entries);
    }

    /// Returns a valid route by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<RouteDefinition>> {
        self.entries.get(name).and_then(|e| e.route().ok())
    }

    /// Returns an entry by name, valid or not.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&RouteEntry> {
        self.entries.get(name)
    }

    /// Iterates valid routes in precedence order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteDefinition>> {
        self.entries.values().filter_map(|e| e.route().ok())
    }

    /// Iterates all entries in precedence order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RouteEntry)> {
        self.entries.iter().map(|(n, e)| (n.as_str(), e))
    }

    /// Iterates route names in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries, including invalid ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that failed validation.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.entries.values().filter(|e| !e.is_valid()).count()
    }

    /// Serializes the table back into source form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.source.clone()))
            .collect();
        Value::Object(map)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for RouteTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(n, e)| (n, &e.source)))
    }
}

impl<'de> Deserialize<'de> for RouteTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut table = Self::new();
        for (name, source) in raw {
            table.insert_value(name, source);
        }
        Ok(table)
    }
}

impl FromIterator<RouteDefinition> for RouteTable {
    fn from_iter<I: IntoIterator<Item = RouteDefinition>>(iter: I) -> Self {
        let mut table = Self::new();
        for route in iter {
            table.insert(route);
        }
        table
    }
}
