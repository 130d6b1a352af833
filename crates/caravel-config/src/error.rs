//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or route files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Failed to read configuration file.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The file extension is neither `.toml` nor `.json`.
    #[error("unsupported configuration format: {format}")]
    UnsupportedFormat {
        /// Extension or format name that was given.
        format: String,
    },

    /// The document root is not a table.
    #[error("configuration root must be a table: {source_name}")]
    NotATable {
        /// File path or other description of the source.
        source_name: String,
    },

    /// An application route override does not name its package.
    #[error("route '{route}' in {source_name} does not declare a package")]
    RouteMissingPackage {
        /// Route name.
        route: String,
        /// File path or other description of the source.
        source_name: String,
    },
}

impl ConfigError {
    /// Create a new file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a new read error.
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Create a new unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a new not-a-table error.
    pub fn not_a_table(source_name: impl Into<String>) -> Self {
        Self::NotATable {
            source_name: source_name.into(),
        }
    }

    /// Create a new missing route package error.
    pub fn route_missing_package(route: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self::RouteMissingPackage {
            route: route.into(),
            source_name: source_name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_error() {
        let err = ConfigError::file_not_found("/path/to/config.toml");
        assert!(err.to_string().contains("/path/to/config.toml"));
    }

    #[test]
    fn test_unsupported_format_error() {
        let err = ConfigError::unsupported_format("yaml");
        assert_eq!(err.to_string(), "unsupported configuration format: yaml");
    }

    #[test]
    fn test_route_missing_package_error() {
        let err = ConfigError::route_missing_package("home", "res/routes.toml");
        assert!(err.to_string().contains("'home'"));
        assert!(err.to_string().contains("res/routes.toml"));
    }
}
