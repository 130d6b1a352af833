//! # Caravel
//!
//! **A small MVC framework: ordered router, dispatch controller, middleware chain**
//!
//! Caravel turns a request into a response by:
//!
//! - matching it against an ordered table of named routes (first match wins)
//! - creating the runnable (controller) the route names and running one action
//! - rendering the action's view, optionally wrapped in a layout
//! - running configured middleware hooks around the runnable
//!
//! Unmatched requests and failures are answered by conventional `Error`
//! runnables in production, and by a diagnostics page elsewhere.
//!
//! ## Quick Start
//!
//! ```rust
//! use caravel::prelude::*;
//! use http::Method;
//! use serde_json::json;
//!
//! #[derive(Default)]
//! struct Index;
//!
//! impl Index {
//!     fn index(&mut self, ctx: &mut RunnableContext, _params: &Params) -> HandlerResult {
//!         ctx.view_mut().set("title", "Welcome");
//!         Ok(())
//!     }
//! }
//!
//! impl Runnable for Index {
//!     fn action(name: &str) -> Option<Action<Self>> {
//!         match name {
//!             "index" => Some(Self::index),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let templates = MemoryTemplates::new().with("SitePackage/index/index", |data| {
//!     Ok(format!("<h1>{}</h1>", data.get_str("title").unwrap_or_default()))
//! });
//!
//! let mut app = Application::builder("/srv/site")
//!     .environment(Environment::test())
//!     .package(Package::inline("Site").with_routes(json!({
//!         "home": {"path": "/", "handler": "Index::index"}
//!     })))
//!     .runnable::<Index>("Site", "Index")
//!     .renderer(templates)
//!     .build();
//!
//! let response = app.run(Request::new(Method::GET, "/"));
//! assert_eq!(response.body(), "<h1>Welcome</h1>");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Application ──► Router ──► RunnableRegistry ──► Runnable ──► View
//!      │                                              ▲
//!      └──────────── MiddlewareChain (before/after) ──┘
//! ```
//!
//! Configuration and routes come from each package's `res/` directory, merged
//! in registration order, then overridden by the application's own `res/`.

#![doc(html_root_url = "https://docs.rs/caravel/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod application;
mod diagnostics;
mod package;
mod settings;

pub use application::{
    Application, ApplicationBuilder, DispatchOutcome, DispatchState, Failure, SETUP_CACHE_TTL,
};
pub use diagnostics::{
    escape_html, render_diagnostics, APPLICATION_ERROR_BODY, ERROR_TITLE, NOT_FOUND_BODY,
    NOT_FOUND_TITLE,
};
pub use package::Package;
pub use settings::{EnvSettings, NoopSettings, ProcessSettings};

// Re-export core types
pub use caravel_core as core;

// Re-export router types
pub use caravel_router as router;

// Re-export middleware types
pub use caravel_middleware as middleware;

// Re-export configuration loading
pub use caravel_config as config;

// Re-export logging and metrics
pub use caravel_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use caravel::prelude::*;
///
/// let app = Application::builder(".").environment(Environment::test()).build();
/// assert!(!app.is_setup());
/// ```
pub mod prelude {
    pub use crate::{Application, DispatchOutcome, DispatchState, Package};

    pub use caravel_core::{
        Action, AuthSession, CacheAdapter, Config, DispatchError, DispatchResult, Environment,
        HandlerResult, MemoryCache, MemoryTemplates, NullCache, Request, Response, Runnable,
        RunnableContext, TemplateRenderer, View, ViewData,
    };

    pub use caravel_middleware::{FnMiddleware, Middleware};

    pub use caravel_router::Params;
}
