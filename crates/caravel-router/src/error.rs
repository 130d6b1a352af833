//! Router error types.

use thiserror::Error;

/// No route in the table accepted the request.
///
/// The display message is fixed; the offending path is available through
/// [`RouteNotFoundError::path`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Route for path not found.")]
pub struct RouteNotFoundError {
    path: String,
}

impl RouteNotFoundError {
    /// Creates the error for a request path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The request path that failed to match.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Why a route entry was rejected during validation.
///
/// Rejected entries stay in the [`RouteTable`](crate::RouteTable) but never
/// match a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteDefinitionError {
    /// The entry has no `path` key.
    #[error("route '{name}' has no path")]
    MissingPath {
        /// Route name.
        name: String,
    },

    /// The entry is not a table/object.
    #[error("route '{name}' must be a table")]
    NotATable {
        /// Route name.
        name: String,
    },

    /// A field has the wrong type or an unreadable value.
    #[error("route '{name}' is malformed: {reason}")]
    Malformed {
        /// Route name.
        name: String,
        /// Deserializer message.
        reason: String,
    },
}

impl RouteDefinitionError {
    /// Creates a [`RouteDefinitionError::Malformed`].
    pub fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The name of the rejected route.
    #[must_use]
    pub fn route_name(&self) -> &str {
        match self {
            Self::MissingPath { name } | Self::NotATable { name } | Self::Malformed { name, .. } => {
                name
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_message() {
        let err = RouteNotFoundError::new("/nope");
        assert_eq!(err.to_string(), "Route for path not found.");
        assert_eq!(err.path(), "/nope");
    }

    #[test]
    fn test_definition_error_route_name() {
        let err = RouteDefinitionError::malformed("index", "invalid type");
        assert_eq!(err.route_name(), "index");
        assert!(err.to_string().contains("invalid type"));
    }
}
