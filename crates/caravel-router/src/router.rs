//! Request matching.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RouteNotFoundError;
use crate::url::UrlResolutionCache;
use crate::{Params, RouteDefinition, RouteTable};

/// Answers role questions for the role guard.
///
/// Implemented by the authentication session; plain role sets implement it
/// too for tests and static setups.
pub trait RoleProvider: Send + Sync {
    /// Returns true if the caller holds `role`.
    fn has_role(&self, role: &str) -> bool;
}

impl RoleProvider for HashSet<String> {
    fn has_role(&self, role: &str) -> bool {
        self.contains(role)
    }
}

impl RoleProvider for BTreeSet<String> {
    fn has_role(&self, role: &str) -> bool {
        self.contains(role)
    }
}

impl RoleProvider for Vec<String> {
    fn has_role(&self, role: &str) -> bool {
        self.iter().any(|r| r == role)
    }
}

/// A successful match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// The matched route.
    pub route: Arc<RouteDefinition>,
    /// Default parameters merged with captured placeholders, in positional order.
    pub params: Params,
    /// Package the route belongs to, if tagged.
    pub package_name: Option<String>,
}

/// Ordered first-match router.
///
/// The router holds the match context for one request (method, path, client
/// IP and an optional role provider) over a shared [`RouteTable`]. Cloning is
/// cheap: the table and the URL memo table are reference counted.
///
/// # Example
///
/// ```rust
/// use caravel_router::{RouteDefinition, RouteTable, Router};
/// use serde_json::json;
///
/// let routes: RouteTable = [
///     RouteDefinition::new("index", "/").handler("Index::index"),
///     RouteDefinition::new("user", "/user/{name}").handler("User::show"),
/// ]
/// .into_iter()
/// .collect();
///
/// let mut router = Router::new(routes);
/// router.set_method("get");
/// router.set_path("/user/joe%20bloggs");
///
/// let matched = router.get_route().unwrap();
/// assert_eq!(matched.route.name(), "user");
/// assert_eq!(matched.params.get("name"), Some("joe bloggs"));
///
/// assert_eq!(router.url_for("user", &[("name", json!("ann"))]), "/user/ann");
/// assert_eq!(router.url_for("nowhere", &[]), "nowhere");
/// ```
#[derive(Clone)]
pub struct Router {
    routes: Arc<RouteTable>,
    method: String,
    path: String,
    ip: Option<String>,
    roles: Option<Arc<dyn RoleProvider>>,
    urls: Arc<UrlResolutionCache>,
}

impl Router {
    /// Creates a router over `routes`, matching `GET /` until told otherwise.
    pub fn new(routes: impl Into<Arc<RouteTable>>) -> Self {
        Self {
            routes: routes.into(),
            method: "GET".to_string(),
            path: "/".to_string(),
            ip: None,
            roles: None,
            urls: Arc::new(UrlResolutionCache::new()),
        }
    }

    /// Shares an existing URL memo table (one per loaded route table).
    pub fn with_url_cache(mut self, urls: Arc<UrlResolutionCache>) -> Self {
        self.urls = urls;
        self
    }

    /// Installs the role provider consulted by role-restricted routes.
    pub fn with_role_provider(mut self, roles: Arc<dyn RoleProvider>) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Replaces the route table. The URL memo table is reset with it.
    pub fn set_routes(&mut self, routes: impl Into<Arc<RouteTable>>) {
        self.routes = routes.into();
        self.urls = Arc::new(UrlResolutionCache::new());
    }

    /// Sets the request method (upper-cased).
    pub fn set_method(&mut self, method: impl AsRef<str>) {
        self.method = method.as_ref().to_ascii_uppercase();
    }

    /// Sets the request path (query string already removed).
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Sets the client IP.
    pub fn set_ip(&mut self, ip: impl Into<String>) {
        self.ip = Some(ip.into());
    }

    /// Sets or clears the role provider.
    pub fn set_role_provider(&mut self, roles: Option<Arc<dyn RoleProvider>>) {
        self.roles = roles;
    }

    /// The route table.
    #[must_use]
    pub fn routes(&self) -> &Arc<RouteTable> {
        &self.routes
    }

    /// The request method being matched.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The request path being matched.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The client IP being matched, if known.
    #[must_use]
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// The URL memo table.
    #[must_use]
    pub fn url_cache(&self) -> &Arc<UrlResolutionCache> {
        &self.urls
    }

    /// Finds the first route accepting the current request.
    ///
    /// Routes are tried in table order. A route is skipped when the method is
    /// not in its verb set, when it has an IP allow-list not containing the
    /// client IP, or when it has a role allow-list and the caller holds none
    /// of those roles. The survivor must then match the path, either
    /// literally or through its `{name}` placeholders.
    pub fn get_route(&self) -> Result<MatchResult, RouteNotFoundError> {
        for route in self.routes.routes() {
            if !self.accepts(route) {
                continue;
            }
            if let Some(params) = route.match_path(&self.path) {
                tracing::debug!(
                    route = route.name(),
                    method = %self.method,
                    path = %self.path,
                    "route matched"
                );
                return Ok(MatchResult {
                    route: Arc::clone(route),
                    params,
                    package_name: route.package_name().map(str::to_string),
                });
            }
        }

        tracing::debug!(method = %self.method, path = %self.path, "no route matched");
        Err(RouteNotFoundError::new(self.path.clone()))
    }

    fn accepts(&self, route: &RouteDefinition) -> bool {
        if !route.methods().contains(&self.method) {
            return false;
        }

        let ips = route.allowed_ips();
        if !ips.is_empty() {
            let Some(ip) = self.ip.as_deref() else {
                return false;
            };
            if !ips.iter().any(|allowed| allowed == ip) {
                tracing::trace!(route = route.name(), ip, "rejected by ip allow-list");
                return false;
            }
        }

        let roles = route.allowed_roles();
        if !roles.is_empty() {
            let Some(provider) = self.roles.as_deref() else {
                return false;
            };
            if !roles.iter().any(|role| provider.has_role(role)) {
                tracing::trace!(route = route.name(), "rejected by role allow-list");
                return false;
            }
        }

        true
    }

    /// Builds the URL of a named route.
    ///
    /// Unknown names come back verbatim. Results are memoized per
    /// `(name, params)` for the lifetime of the route table.
    pub fn url_for(&self, name: &str, params: &[(&str, Value)]) -> String {
        self.urls.resolve(&self.routes, name, params)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouteTable::new())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes.len())
            .field("method", &self.method)
            .field("path", &self.path)
            .field("ip", &self.ip)
            .field("has_role_provider", &self.roles.is_some())
            .finish()
    }
}
