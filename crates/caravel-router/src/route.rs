//! Route definitions.
//!
//! A route is declared in source form as a table of string keys:
//!
//! ```toml
//! [user_profile]
//! path = "/user/{name}"
//! method = "GET|POST"
//! handler = "User::profile"
//! "allow.from" = "127.0.0.1|10.0.0.1"
//! "allow.roles" = "admin|editor"
//! "view.directRender" = false
//! "view.layout" = "Admin::main"
//! params = { page = 1 }
//! ```
//!
//! Dotted keys are accepted both flat (`"allow.from"`) and nested
//! (`allow = { from = ... }`), so plain TOML dotted keys work too.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::decode::decode_component;
use crate::error::RouteDefinitionError;
use crate::{MethodSet, Params};

/// One `/`-delimited piece of a route path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the decoded request segment.
    Literal(String),
    /// Captures the decoded request segment under this name.
    Param(String),
}

impl Segment {
    fn parse(raw: &str) -> Self {
        raw.strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
            .filter(|name| is_param_name(name))
            .map_or_else(|| Self::Literal(raw.to_string()), |name| Self::Param(name.to_string()))
    }
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// A parsed `Class::method` handler reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    /// Runnable class name within the package.
    pub class: String,
    /// Action (method) name.
    pub action: String,
}

impl HandlerRef {
    /// Parses `"Class::method"`. Returns `None` when either half is missing.
    ///
    /// ```rust
    /// use caravel_router::HandlerRef;
    ///
    /// let handler = HandlerRef::parse("Index::index").unwrap();
    /// assert_eq!(handler.class, "Index");
    /// assert_eq!(handler.action, "index");
    /// assert!(HandlerRef::parse("Index").is_none());
    /// ```
    #[must_use]
    pub fn parse(reference: &str) -> Option<Self> {
        let (class, action) = reference.split_once("::")?;
        let (class, action) = (class.trim(), action.trim());
        if class.is_empty() || action.is_empty() {
            return None;
        }
        Some(Self {
            class: class.to_string(),
            action: action.to_string(),
        })
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.action)
    }
}

/// A validated route entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    name: String,
    path: String,
    methods: MethodSet,
    handler: Option<String>,
    allow_from: Vec<String>,
    allow_roles: Vec<String>,
    direct_render: bool,
    layout: Option<String>,
    package: Option<String>,
    defaults: Params,
    segments: Vec<Segment>,
    has_placeholders: bool,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    path: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default, alias = "runnable")]
    handler: Option<String>,
    #[serde(default)]
    allow: RawAllow,
    #[serde(default, rename = "allow.from")]
    allow_from: Option<String>,
    #[serde(default, rename = "allow.roles")]
    allow_roles: Option<String>,
    #[serde(default)]
    view: RawView,
    #[serde(default, rename = "view.directRender")]
    direct_render: Option<bool>,
    #[serde(default, rename = "view.layout")]
    layout: Option<String>,
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    params: IndexMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAllow {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    roles: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawView {
    #[serde(default, rename = "directRender", alias = "direct_render")]
    direct_render: Option<bool>,
    #[serde(default)]
    layout: Option<String>,
}

fn split_pipes(list: Option<String>) -> Vec<String> {
    list.map(|s| {
        s.split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl RouteDefinition {
    /// Creates a `GET` route with no handler and no restrictions.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let segments: Vec<Segment> = path.split('/').map(Segment::parse).collect();
        let has_placeholders = segments.iter().any(|s| matches!(s, Segment::Param(_)));
        Self {
            name: name.into(),
            path,
            methods: MethodSet::default(),
            handler: None,
            allow_from: Vec::new(),
            allow_roles: Vec::new(),
            direct_render: false,
            layout: None,
            package: None,
            defaults: Params::new(),
            segments,
            has_placeholders,
        }
    }

    /// Validates a route entry in source form.
    pub fn from_value(name: &str, value: &Value) -> Result<Self, RouteDefinitionError> {
        let Some(table) = value.as_object() else {
            return Err(RouteDefinitionError::NotATable {
                name: name.to_string(),
            });
        };
        if !table.contains_key("path") {
            return Err(RouteDefinitionError::MissingPath {
                name: name.to_string(),
            });
        }

        let raw: RawRoute = serde_json::from_value(value.clone())
            .map_err(|e| RouteDefinitionError::malformed(name, e.to_string()))?;

        let mut defaults = Params::with_capacity(raw.params.len());
        for (key, value) in &raw.params {
            let Some(value) = scalar_to_string(value) else {
                return Err(RouteDefinitionError::malformed(
                    name,
                    format!("default param '{key}' must be a scalar"),
                ));
            };
            defaults.insert(key.clone(), value);
        }

        let mut route = Self::new(name, raw.path);
        route.methods = raw.method.as_deref().map(MethodSet::parse).unwrap_or_default();
        route.handler = raw.handler;
        route.allow_from = split_pipes(raw.allow_from.or(raw.allow.from));
        route.allow_roles = split_pipes(raw.allow_roles.or(raw.allow.roles));
        route.direct_render = raw.direct_render.or(raw.view.direct_render).unwrap_or(false);
        route.layout = raw.layout.or(raw.view.layout);
        route.package = raw.package;
        route.defaults = defaults;
        Ok(route)
    }

    /// Serializes the route back into flat source form.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut table = Map::new();
        table.insert("path".into(), Value::String(self.path.clone()));
        table.insert("method".into(), Value::String(self.methods.to_string()));
        if let Some(handler) = &self.handler {
            table.insert("handler".into(), Value::String(handler.clone()));
        }
        if !self.allow_from.is_empty() {
            table.insert("allow.from".into(), Value::String(self.allow_from.join("|")));
        }
        if !self.allow_roles.is_empty() {
            table.insert("allow.roles".into(), Value::String(self.allow_roles.join("|")));
        }
        if self.direct_render {
            table.insert("view.directRender".into(), Value::Bool(true));
        }
        if let Some(layout) = &self.layout {
            table.insert("view.layout".into(), Value::String(layout.clone()));
        }
        if let Some(package) = &self.package {
            table.insert("package".into(), Value::String(package.clone()));
        }
        if !self.defaults.is_empty() {
            let params = self
                .defaults
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            table.insert("params".into(), Value::Object(params));
        }
        Value::Object(table)
    }

    /// Sets the accepted verbs from a pipe-delimited list.
    pub fn method(mut self, methods: &str) -> Self {
        self.methods = MethodSet::parse(methods);
        self
    }

    /// Sets the `Class::method` handler reference.
    pub fn handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    /// Restricts the route to a pipe-delimited list of client IPs.
    pub fn allow_from(mut self, ips: &str) -> Self {
        self.allow_from = split_pipes(Some(ips.to_string()));
        self
    }

    /// Restricts the route to callers holding any of a pipe-delimited list of roles.
    pub fn allow_roles(mut self, roles: &str) -> Self {
        self.allow_roles = split_pipes(Some(roles.to_string()));
        self
    }

    /// Marks the route as rendering its view without calling an action.
    pub fn direct_render(mut self, direct: bool) -> Self {
        self.direct_render = direct;
        self
    }

    /// Sets the view layout.
    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    /// Tags the route with its owning package.
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    /// Adds a default parameter.
    pub fn default_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(name, value);
        self
    }

    /// Route name (table key).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path template.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Accepted verbs.
    #[must_use]
    pub fn methods(&self) -> &MethodSet {
        &self.methods
    }

    /// Raw handler reference, if declared.
    #[must_use]
    pub fn handler_str(&self) -> Option<&str> {
        self.handler.as_deref()
    }

    /// Parsed handler reference, if declared and well-formed.
    #[must_use]
    pub fn handler_ref(&self) -> Option<HandlerRef> {
        self.handler.as_deref().and_then(HandlerRef::parse)
    }

    /// IP allow-list; empty means unrestricted.
    #[must_use]
    pub fn allowed_ips(&self) -> &[String] {
        &self.allow_from
    }

    /// Role allow-list; empty means unrestricted.
    #[must_use]
    pub fn allowed_roles(&self) -> &[String] {
        &self.allow_roles
    }

    /// Whether the view is rendered without calling an action.
    #[must_use]
    pub fn is_direct_render(&self) -> bool {
        self.direct_render
    }

    /// View layout, if declared.
    #[must_use]
    pub fn layout_name(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Owning package, if tagged.
    #[must_use]
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_deref()
    }

    /// Default parameters.
    #[must_use]
    pub fn defaults(&self) -> &Params {
        &self.defaults
    }

    /// Parsed path segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether the path contains at least one `{name}` segment.
    #[must_use]
    pub fn has_placeholders(&self) -> bool {
        self.has_placeholders
    }

    /// Matches a request path against this route's template.
    ///
    /// A literal path match returns the defaults. Otherwise the path is split
    /// on `/` and compared segment by segment; counts must agree exactly.
    /// Captured values are merged over the defaults.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Params> {
        if self.path == path {
            return Some(self.defaults.clone());
        }
        if !self.has_placeholders || path.split('/').count() != self.segments.len() {
            return None;
        }

        let mut captured = Params::new();
        for (segment, raw) in self.segments.iter().zip(path.split('/')) {
            let decoded = decode_component(raw);
            match segment {
                Segment::Literal(literal) if *literal == decoded => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => captured.insert(name.clone(), decoded.into_owned()),
            }
        }

        let mut params = self.defaults.clone();
        params.merge(&captured);
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("{id}"), Segment::Param("id".into()));
        assert_eq!(Segment::parse("users"), Segment::Literal("users".into()));
        assert_eq!(Segment::parse("{}"), Segment::Literal("{}".into()));
        assert_eq!(Segment::parse("{a-b}"), Segment::Literal("{a-b}".into()));
        assert_eq!(Segment::parse("x{id}"), Segment::Literal("x{id}".into()));
    }

    #[test]
    fn test_from_value_defaults() {
        let route = RouteDefinition::from_value("index", &json!({"path": "/"})).unwrap();
        assert_eq!(route.path(), "/");
        assert_eq!(route.methods(), &MethodSet::default());
        assert!(route.allowed_ips().is_empty());
        assert!(route.allowed_roles().is_empty());
        assert!(!route.is_direct_render());
        assert!(route.layout_name().is_none());
        assert!(route.defaults().is_empty());
    }

    #[test]
    fn test_from_value_flat_keys() {
        let route = RouteDefinition::from_value(
            "admin",
            &json!({
                "path": "/admin",
                "method": "post|put",
                "handler": "Admin::index",
                "allow.from": "127.0.0.1|10.0.0.1",
                "allow.roles": "admin|editor",
                "view.directRender": true,
                "view.layout": "Admin::main",
                "package": "AdminPackage",
                "params": {"page": 1, "sort": "asc"}
            }),
        )
        .unwrap();

        assert_eq!(route.methods().to_string(), "POST|PUT");
        assert_eq!(route.handler_str(), Some("Admin::index"));
        assert_eq!(route.allowed_ips(), ["127.0.0.1", "10.0.0.1"]);
        assert_eq!(route.allowed_roles(), ["admin", "editor"]);
        assert!(route.is_direct_render());
        assert_eq!(route.layout_name(), Some("Admin::main"));
        assert_eq!(route.package_name(), Some("AdminPackage"));
        assert_eq!(route.defaults().get("page"), Some("1"));
    }

    #[test]
    fn test_from_value_nested_keys_and_runnable_alias() {
        let route = RouteDefinition::from_value(
            "nested",
            &json!({
                "path": "/n",
                "runnable": "Index::index",
                "allow": {"from": "1.2.3.4"},
                "view": {"directRender": false, "layout": "main"}
            }),
        )
        .unwrap();

        assert_eq!(route.handler_ref().unwrap().to_string(), "Index::index");
        assert_eq!(route.allowed_ips(), ["1.2.3.4"]);
        assert_eq!(route.layout_name(), Some("main"));
    }

    #[test]
    fn test_from_value_rejects_bad_entries() {
        assert!(matches!(
            RouteDefinition::from_value("x", &json!({"method": "GET"})),
            Err(RouteDefinitionError::MissingPath { .. })
        ));
        assert!(matches!(
            RouteDefinition::from_value("x", &json!("/path")),
            Err(RouteDefinitionError::NotATable { .. })
        ));
        assert!(matches!(
            RouteDefinition::from_value("x", &json!({"path": "/", "view.directRender": "yes"})),
            Err(RouteDefinitionError::Malformed { .. })
        ));
        assert!(matches!(
            RouteDefinition::from_value("x", &json!({"path": "/", "view.layout": 5})),
            Err(RouteDefinitionError::Malformed { .. })
        ));
        assert!(matches!(
            RouteDefinition::from_value("x", &json!({"path": "/", "params": {"a": [1]}})),
            Err(RouteDefinitionError::Malformed { .. })
        ));
    }

    #[test]
    fn test_to_value_round_trips() {
        let route = RouteDefinition::new("r", "/r/{id}")
            .method("GET|POST")
            .handler("R::show")
            .allow_roles("admin")
            .layout("main")
            .package("RPackage")
            .default_param("id", "0");

        let parsed = RouteDefinition::from_value("r", &route.to_value()).unwrap();
        assert_eq!(parsed, route);
    }

    #[test]
    fn test_match_path_direct_returns_defaults() {
        let route = RouteDefinition::new("home", "/").default_param("page", "1");
        let params = route.match_path("/").unwrap();
        assert_eq!(params.get("page"), Some("1"));
    }

    #[test]
    fn test_match_path_captures_decoded() {
        let route = RouteDefinition::new("user", "/user/{name}");
        let params = route.match_path("/user/joe%20bloggs").unwrap();
        assert_eq!(params.get("name"), Some("joe bloggs"));
    }

    #[test]
    fn test_match_path_segment_count_must_agree() {
        let route = RouteDefinition::new("ab", "/a/{x}/b");
        assert!(route.match_path("/a/1/2/3").is_none());
        assert!(route.match_path("/a/1").is_none());
        assert!(route.match_path("/a/1/c").is_none());
        assert_eq!(route.match_path("/a/1/b").unwrap().get("x"), Some("1"));
    }

    #[test]
    fn test_match_path_trailing_slash_is_a_segment() {
        let route = RouteDefinition::new("item", "/item/{id}");
        assert!(route.match_path("/item/7/").is_none());
        assert_eq!(route.match_path("/item/").unwrap().get("id"), Some(""));
    }

    #[test]
    fn test_match_path_captured_overrides_defaults() {
        let route = RouteDefinition::new("list", "/list/{page}")
            .default_param("page", "1")
            .default_param("sort", "asc");
        let params = route.match_path("/list/3").unwrap();
        assert_eq!(params.values().collect::<Vec<_>>(), vec!["3", "asc"]);
    }

    #[test]
    fn test_literal_route_never_matches_other_paths() {
        let route = RouteDefinition::new("about", "/about");
        assert!(route.match_path("/about/").is_none());
        assert!(route.match_path("/About").is_none());
    }
}
