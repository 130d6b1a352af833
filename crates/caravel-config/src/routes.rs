//! Route file loader.
//!
//! Package route files are tagged with their package; the application's
//! override file must tag every route itself.

use std::path::Path;

use caravel_router::RouteTable;
use serde_json::{Map, Value};

use crate::loader::read_file;
use crate::ConfigError;

const PACKAGE_KEY: &str = "package";

/// Builds the merged route table.
///
/// Routes keep the position of their first appearance; a later file that
/// redefines a route name replaces its definition.
#[derive(Debug, Default)]
pub struct RouteLoader {
    routes: Map<String, Value>,
}

impl RouteLoader {
    /// Creates an empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a package route file, tagging routes that carry no package.
    ///
    /// Returns `Ok(false)` when the file does not exist.
    pub fn merge_package_file(&mut self, path: &Path, package: &str) -> Result<bool, ConfigError> {
        if !path.exists() {
            return Ok(false);
        }
        let routes = routes_of(read_file(path)?, path)?;
        self.merge_package_routes(routes, package);
        tracing::debug!(path = %path.display(), package, "package routes merged");
        Ok(true)
    }

    /// Merges routes declared by `package` from an in-memory document.
    pub fn merge_package_value(&mut self, value: Value, package: &str) -> Result<(), ConfigError> {
        let routes = match value {
            Value::Object(routes) => routes,
            _ => return Err(ConfigError::not_a_table(package)),
        };
        self.merge_package_routes(routes, package);
        Ok(())
    }

    /// Merges the application override file.
    ///
    /// Every route must declare its package. If one does not, nothing from
    /// the file is merged and [`ConfigError::RouteMissingPackage`] is
    /// returned. Returns `Ok(false)` when the file does not exist.
    pub fn merge_override_file(&mut self, path: &Path) -> Result<bool, ConfigError> {
        if !path.exists() {
            return Ok(false);
        }
        let routes = routes_of(read_file(path)?, path)?;

        if let Some((name, _)) = routes.iter().find(|(_, route)| route.get(PACKAGE_KEY).is_none()) {
            return Err(ConfigError::route_missing_package(
                name.clone(),
                path.display().to_string(),
            ));
        }

        self.routes.extend(routes);
        tracing::debug!(path = %path.display(), "route overrides merged");
        Ok(true)
    }

    /// Number of route entries collected.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The collected routes as one document.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.routes.clone())
    }

    /// Validates the collected routes into a table.
    #[must_use]
    pub fn build(self) -> RouteTable {
        RouteTable::from_value(&Value::Object(self.routes))
    }

    fn merge_package_routes(&mut self, routes: Map<String, Value>, package: &str) {
        for (name, mut route) in routes {
            if let Value::Object(fields) = &mut route {
                fields
                    .entry(PACKAGE_KEY)
                    .or_insert_with(|| Value::String(package.to_string()));
            }
            self.routes.insert(name, route);
        }
    }
}

fn routes_of(value: Value, path: &Path) -> Result<Map<String, Value>, ConfigError> {
    match value {
        Value::Object(routes) => Ok(routes),
        _ => Err(ConfigError::not_a_table(path.display().to_string())),
    }
}
