//! # Caravel Middleware
//!
//! Before/after hooks run around every dispatch.
//!
//! Middleware is registered by name in a [`MiddlewareRegistry`]. For each
//! request the application builds a [`MiddlewareChain`] from its ordered list
//! of middleware names:
//!
//! ```text
//! before(m1) → before(m2) → runnable → finalise → after(m1) → after(m2)
//! ```
//!
//! After-hooks run in registration order, not in reverse, and only for the
//! middleware whose before-hook completed. Names with no registered factory
//! are skipped.
//!
//! ## Example
//!
//! ```
//! use caravel_core::{Request, Response};
//! use caravel_middleware::{FnMiddleware, MiddlewareChain, MiddlewareRegistry};
//! use http::Method;
//!
//! let mut registry = MiddlewareRegistry::new();
//! registry.register("powered_by", || {
//!     FnMiddleware::before(|_req, res| {
//!         res.set_header("X-Powered-By", "caravel", true);
//!         Ok(())
//!     })
//! });
//!
//! let request = Request::new(Method::GET, "/");
//! let mut response = Response::new();
//! let mut chain = MiddlewareChain::new();
//! chain
//!     .run_before(&registry, ["powered_by", "unknown"], &request, &mut response)
//!     .unwrap();
//! chain.run_after(&request, &mut response).unwrap();
//!
//! assert_eq!(chain.started(), vec!["powered_by"]);
//! assert_eq!(response.header("x-powered-by"), Some("caravel"));
//! ```

#![doc(html_root_url = "https://docs.rs/caravel-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod error;
pub mod middleware;
pub mod registry;
pub mod stages;

pub use chain::MiddlewareChain;
pub use error::{MiddlewareError, Phase};
pub use middleware::{FnMiddleware, Middleware};
pub use registry::{MiddlewareFactory, MiddlewareRegistry};
pub use stages::{RequestIdMiddleware, TimingMiddleware, REQUEST_ID_HEADER, SERVER_TIMING_HEADER};
