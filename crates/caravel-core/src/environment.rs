//! Application mode.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable holding the application mode.
pub const ENV_VAR: &str = "APP_ENV";

/// The mode the application runs in.
///
/// Modes are free-form lower-case strings. `development` and `test` are
/// permissive; anything else, including unknown modes, is production.
///
/// ```
/// use caravel_core::Environment;
///
/// assert!(Environment::new("Staging").is_production());
/// assert!(!Environment::development().is_production());
/// assert_eq!(Environment::new("TEST").mode(), "test");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    mode: String,
}

impl Environment {
    /// Creates an environment for a mode (lower-cased).
    pub fn new(mode: impl AsRef<str>) -> Self {
        Self {
            mode: mode.as_ref().trim().to_lowercase(),
        }
    }

    /// Reads the mode from `APP_ENV`, defaulting to production.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(ENV_VAR)
            .ok()
            .filter(|mode| !mode.trim().is_empty())
            .map_or_else(Self::production, Self::new)
    }

    /// The production environment.
    #[must_use]
    pub fn production() -> Self {
        Self::new("production")
    }

    /// The development environment.
    #[must_use]
    pub fn development() -> Self {
        Self::new("development")
    }

    /// The test environment.
    #[must_use]
    pub fn test() -> Self {
        Self::new("test")
    }

    /// The mode name.
    #[must_use]
    pub fn mode(&self) -> &str {
        &self.mode
    }

    /// Production, or any mode that is neither test nor development.
    #[must_use]
    pub fn is_production(&self) -> bool {
        self.mode == "production" || (!self.is_test() && !self.is_development())
    }

    /// Test mode.
    #[must_use]
    pub fn is_test(&self) -> bool {
        self.mode == "test"
    }

    /// Development mode.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.mode == "development"
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::production()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mode)
    }
}
