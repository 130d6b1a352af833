//! # Caravel Core
//!
//! Core types and traits for the Caravel MVC framework.
//!
//! - [`Request`] - Immutable snapshot of the incoming request
//! - [`Response`] - Status, ordered headers and body built during dispatch
//! - [`View`] / [`TemplateRenderer`] - View state and value-returning rendering
//! - [`Runnable`] / [`RunnableRegistry`] - Controller contract and registration
//! - [`RunnableContext`] - Everything a runnable can reach during one dispatch
//! - [`CacheAdapter`] - Key/value cache contract with [`NullCache`] and [`MemoryCache`]
//! - [`AuthSession`] - Identity and roles, usable as the router's role guard
//! - [`DispatchError`] - Errors at the dispatch boundary
//!
//! ## Example
//!
//! ```
//! use caravel_core::{MemoryTemplates, Request, RunnableContext, View};
//! use http::Method;
//! use std::sync::Arc;
//!
//! let request = Arc::new(Request::new(Method::GET, "/hello?name=ann"));
//! let mut ctx = RunnableContext::new(request, View::new("Demo", "Greeter", "hello"));
//! let name = ctx.request().query("name").unwrap_or("world").to_string();
//! ctx.view_mut().set("name", name);
//!
//! let templates = MemoryTemplates::new().with("DemoPackage/greeter/hello", |data| {
//!     Ok(format!("Hello, {}!", data.get_str("name").unwrap_or_default()))
//! });
//! ctx.finalise(&templates).unwrap();
//! assert_eq!(ctx.response().body(), "Hello, ann!");
//! ```

#![doc(html_root_url = "https://docs.rs/caravel-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod auth;
mod cache;
mod config;
mod context;
mod environment;
mod error;
mod request;
mod response;
mod runnable;
mod view;

pub use auth::{login_with, AuthAdapter, AuthError, AuthOutcome, AuthSession};
pub use cache::{CacheAdapter, CacheStats, MemoryCache, NullCache};
pub use config::{Config, INI_SET_KEY};
pub use context::{
    RunnableContext, DEFAULT_ERROR_PACKAGE, ERROR_CLASS, NOT_FOUND_ACTION,
    UNCAUGHT_EXCEPTION_ACTION,
};
pub use environment::{Environment, ENV_VAR};
pub use error::{
    DispatchError, DispatchResult, ErrorCategory, HandlerResult, ResponseError, ViewError,
};
pub use request::{Request, RequestId};
pub use response::{Response, REDIRECT_STATUSES};
pub use runnable::{Action, ErasedRunnable, Runnable, RunnableFactory, RunnableRegistry};
pub use view::{normalise_package, MemoryTemplates, TemplateRenderer, View, ViewData};
