//! Packages: bundles of runnables, routes and configuration.

use std::path::{Path, PathBuf};

use caravel_config::resource_file;
use caravel_core::normalise_package;
use serde_json::Value;

/// A registered package.
///
/// Routes and configuration come from `<dir>/res/routes.toml` and
/// `<dir>/res/config.toml` (or their JSON siblings), followed by any inline
/// documents given with [`with_routes`](Self::with_routes) and
/// [`with_config`](Self::with_config).
///
/// # Example
///
/// ```
/// use caravel::Package;
/// use serde_json::json;
///
/// let package = Package::inline("Blog")
///     .with_routes(json!({"home": {"path": "/", "handler": "Index::index"}}));
/// assert_eq!(package.name(), "BlogPackage");
/// assert!(package.dir().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    dir: Option<PathBuf>,
    routes: Option<Value>,
    config: Option<Value>,
}

impl Package {
    /// A package rooted at `dir`.
    pub fn new(name: &str, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: normalise_package(name),
            dir: Some(dir.into()),
            routes: None,
            config: None,
        }
    }

    /// A package without a directory.
    pub fn inline(name: &str) -> Self {
        Self {
            name: normalise_package(name),
            dir: None,
            routes: None,
            config: None,
        }
    }

    /// Adds an inline route document.
    #[must_use]
    pub fn with_routes(mut self, routes: Value) -> Self {
        self.routes = Some(routes);
        self
    }

    /// Adds an inline configuration document.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Package name, always ending with `Package`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package directory.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// The package's configuration file, if present on disk.
    pub fn config_file(&self) -> Option<PathBuf> {
        self.dir.as_deref().and_then(|dir| resource_file(dir, "config"))
    }

    /// The package's route file, if present on disk.
    pub fn routes_file(&self) -> Option<PathBuf> {
        self.dir.as_deref().and_then(|dir| resource_file(dir, "routes"))
    }

    /// Inline route document.
    pub fn inline_routes(&self) -> Option<&Value> {
        self.routes.as_ref()
    }

    /// Inline configuration document.
    pub fn inline_config(&self) -> Option<&Value> {
        self.config.as_ref()
    }
}
