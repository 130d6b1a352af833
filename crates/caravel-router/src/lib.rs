//! Ordered first-match router for Caravel.
//!
//! Routes are named entries in a [`RouteTable`]. Matching walks the table in
//! insertion order and returns the first route that survives every guard:
//!
//! 1. the request method must be in the route's verb set (default `GET`);
//! 2. a route with an IP allow-list only accepts listed client IPs;
//! 3. a route with a role allow-list only accepts callers holding one of the
//!    roles, as reported by a [`RoleProvider`];
//! 4. the path must equal the template literally, or match it segment by
//!    segment with `{name}` placeholders capturing decoded values.
//!
//! Malformed entries are kept in the table but never match. Named routes can
//! be turned back into URLs with [`Router::url_for`], which memoizes results.
//!
//! # Example
//!
//! ```rust
//! use caravel_router::{Router, RouteTable};
//! use serde_json::json;
//!
//! let routes = RouteTable::from_value(&json!({
//!     "multi": {"path": "/multi", "method": "POST|PUT|DELETE", "handler": "Index::multi"},
//!     "local": {"path": "/local", "allow.from": "127.0.0.1", "handler": "Index::local"},
//! }));
//!
//! let mut router = Router::new(routes);
//! router.set_method("PUT");
//! router.set_path("/multi");
//! assert_eq!(router.get_route().unwrap().route.name(), "multi");
//!
//! router.set_method("GET");
//! router.set_path("/local");
//! router.set_ip("111.111.111.111");
//! assert!(router.get_route().is_err());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod decode;
mod error;
mod method_set;
mod params;
mod route;
mod router;
mod table;
mod url;

pub use decode::decode_component;
pub use error::{RouteDefinitionError, RouteNotFoundError};
pub use method_set::MethodSet;
pub use params::Params;
pub use route::{HandlerRef, RouteDefinition, Segment};
pub use router::{MatchResult, RoleProvider, Router};
pub use table::{RouteEntry, RouteTable};
pub use url::{build_url, UrlCacheStats, UrlResolutionCache};
