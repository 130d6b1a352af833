//! Middleware errors.

use std::fmt;

use thiserror::Error;

/// Which hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The before-hook.
    Before,
    /// The after-hook.
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => f.write_str("before"),
            Self::After => f.write_str("after"),
        }
    }
}

/// A middleware hook returned an error.
#[derive(Debug, Error)]
#[error("Middleware '{name}' failed in {phase} hook: {source}")]
pub struct MiddlewareError {
    /// Registered name of the middleware.
    pub name: String,
    /// Hook that failed.
    pub phase: Phase,
    /// The hook's error.
    #[source]
    pub source: anyhow::Error,
}

impl MiddlewareError {
    /// Creates a new middleware error.
    pub fn new(name: impl Into<String>, phase: Phase, source: impl Into<anyhow::Error>) -> Self {
        Self {
            name: name.into(),
            phase,
            source: source.into(),
        }
    }
}
