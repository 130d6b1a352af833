//! HTTP verb sets for route method filters.

use std::fmt;

use http::Method;
use smallvec::SmallVec;

/// The set of HTTP verbs a route accepts.
///
/// Routes declare verbs as a pipe-delimited string (`"POST|PUT|DELETE"`).
/// Verbs are trimmed and upper-cased; empty tokens are ignored. A route that
/// declares nothing accepts `GET` only.
///
/// # Example
///
/// ```rust
/// use caravel_router::MethodSet;
///
/// let set = MethodSet::parse("post|PUT | delete");
/// assert!(set.contains("POST"));
/// assert!(set.contains("delete"));
/// assert!(!set.contains("GET"));
/// assert_eq!(set.to_string(), "POST|PUT|DELETE");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSet {
    methods: SmallVec<[String; 4]>,
}

impl MethodSet {
    /// Creates an empty set. An empty set matches nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            methods: SmallVec::new(),
        }
    }

    /// Parses a pipe-delimited verb list.
    ///
    /// Falls back to `GET` when no verb survives parsing.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        let mut set = Self::empty();
        for token in list.split('|') {
            set.insert(token);
        }
        if set.is_empty() {
            set.insert("GET");
        }
        set
    }

    /// Adds a verb. Returns false when it was already present or blank.
    pub fn insert(&mut self, method: impl AsRef<str>) -> bool {
        let method = method.as_ref().trim().to_ascii_uppercase();
        if method.is_empty() || self.methods.contains(&method) {
            return false;
        }
        self.methods.push(method);
        true
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, method: impl AsRef<str>) -> Self {
        self.insert(method);
        self
    }

    /// Returns true if the verb is in the set (case-insensitive).
    #[must_use]
    pub fn contains(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }

    /// Returns true if the `http` method is in the set.
    #[must_use]
    pub fn contains_method(&self, method: &Method) -> bool {
        self.contains(method.as_str())
    }

    /// Returns the verbs as `http::Method` values, skipping unparseable tokens.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.methods
            .iter()
            .filter_map(|m| Method::from_bytes(m.as_bytes()).ok())
            .collect()
    }

    /// Iterates the verbs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    /// Number of verbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        Self::parse("GET")
    }
}

impl fmt::Display for MethodSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.methods.join("|"))
    }
}

impl From<&str> for MethodSet {
    fn from(list: &str) -> Self {
        Self::parse(list)
    }
}
