//! Configuration and route file loading for Caravel.
//!
//! Packages and applications keep their resource files below `res/`:
//!
//! ```text
//! <dir>/res/config.toml   flat key/value configuration
//! <dir>/res/routes.toml   route table, one table per route name
//! ```
//!
//! JSON siblings (`config.json`, `routes.json`) are read when the TOML file is
//! absent. The format is chosen by extension.
//!
//! # Route File Format
//!
//! ```toml
//! [home]
//! path = "/"
//! handler = "Index::index"
//!
//! [user]
//! path = "/user/{name}"
//! method = "GET|POST"
//! handler = "User::show"
//! allow.from = "127.0.0.1|10.0.0.1"
//! allow.roles = "admin|editor"
//! view.layout = "main"
//!
//! [about]
//! path = "/about"
//! handler = "Page::about"
//! view.directRender = true
//! ```
//!
//! # Example
//!
//! ```
//! use caravel_config::{ConfigLoader, RouteLoader};
//! use serde_json::json;
//!
//! let config = ConfigLoader::new()
//!     .with_string(r#"{"BlogPackage.title": "Blog", "Other.key": 1}"#, "json", Some("BlogPackage"))
//!     .unwrap()
//!     .load();
//! assert_eq!(config.len(), 1);
//!
//! let mut routes = RouteLoader::new();
//! routes
//!     .merge_package_value(json!({"home": {"path": "/", "handler": "Index::index"}}), "BlogPackage")
//!     .unwrap();
//! let table = routes.build();
//! assert_eq!(table.get("home").unwrap().package_name(), Some("BlogPackage"));
//! ```

#![doc(html_root_url = "https://docs.rs/caravel-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loader;
mod routes;

pub use error::ConfigError;
pub use loader::{parse_str, read_file, resource_file, ConfigLoader, RESOURCE_DIR};
pub use routes::RouteLoader;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
