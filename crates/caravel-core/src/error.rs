//! Error types for Caravel.
//!
//! [`DispatchError`] is the taxonomy used at the dispatch boundary. Every
//! variant maps to an [`ErrorCategory`], which in turn maps to the HTTP status
//! the fallback flow responds with.
//!
//! | Variant | Category | Status |
//! |---|---|---|
//! | `RouteNotFound` | `NotFound` | 404 |
//! | `RunnableNotFound` | `Internal` | 500 |
//! | `PackageNotFound` | `Internal` | 500 |
//! | `PackagesNotFound` | `Configuration` | 500 |
//! | `AlreadySetup` | `Configuration` | 500 |
//! | `Middleware` | `Internal` | 500 |
//! | `View` | `Internal` | 500 |
//! | `Handler` | `Internal` | 500 |
//! | `Setup` | `Configuration` | 500 |

use std::path::PathBuf;

use caravel_router::RouteNotFoundError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`DispatchError`].
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result of a runnable action or lifecycle hook.
///
/// Business logic reports failures with `anyhow`; the dispatcher wraps them
/// into [`DispatchError::Handler`].
pub type HandlerResult = anyhow::Result<()>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Nothing handles the request.
    NotFound,
    /// Something failed while handling the request.
    Internal,
    /// The application itself is misconfigured or misused.
    Configuration,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal | Self::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors raised while setting up or dispatching a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No route accepted the request.
    #[error(transparent)]
    RouteNotFound(#[from] RouteNotFoundError),

    /// The matched route points at a class or action that is not registered.
    #[error("No such runnable: {package}::{class}::{action}")]
    RunnableNotFound {
        /// Package the route belongs to.
        package: String,
        /// Runnable class name.
        class: String,
        /// Action name.
        action: String,
    },

    /// A package lookup failed.
    #[error("Package not found: {name}")]
    PackageNotFound {
        /// Requested package name.
        name: String,
    },

    /// The application has no packages, even after setup.
    #[error("Application has no packages ({})", .app_dir.display())]
    PackagesNotFound {
        /// Application directory.
        app_dir: PathBuf,
    },

    /// The cache adapter was replaced after setup.
    #[error("You cannot set the cache after calling setup()")]
    AlreadySetup,

    /// A middleware hook failed.
    #[error("Middleware '{name}' failed: {source}")]
    Middleware {
        /// Middleware name.
        name: String,
        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },

    /// View rendering failed.
    #[error(transparent)]
    View(#[from] ViewError),

    /// A runnable action or lifecycle hook failed.
    #[error("Handler error: {0}")]
    Handler(#[source] anyhow::Error),

    /// Setup could not complete.
    #[error("Setup error: {message}")]
    Setup {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl DispatchError {
    /// Creates a [`DispatchError::RunnableNotFound`].
    pub fn runnable_not_found(
        package: impl Into<String>,
        class: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self::RunnableNotFound {
            package: package.into(),
            class: class.into(),
            action: action.into(),
        }
    }

    /// Creates a [`DispatchError::PackageNotFound`].
    pub fn package_not_found(name: impl Into<String>) -> Self {
        Self::PackageNotFound { name: name.into() }
    }

    /// Creates a [`DispatchError::Middleware`].
    pub fn middleware(name: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Middleware {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Creates a [`DispatchError::Handler`].
    pub fn handler(source: impl Into<anyhow::Error>) -> Self {
        Self::Handler(source.into())
    }

    /// Creates a [`DispatchError::Setup`] without a source.
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a [`DispatchError::Setup`] with a source error.
    pub fn setup_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Setup {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::RouteNotFound(_) => ErrorCategory::NotFound,
            Self::RunnableNotFound { .. }
            | Self::PackageNotFound { .. }
            | Self::Middleware { .. }
            | Self::View(_)
            | Self::Handler(_) => ErrorCategory::Internal,
            Self::PackagesNotFound { .. } | Self::AlreadySetup | Self::Setup { .. } => {
                ErrorCategory::Configuration
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RouteNotFound(_) => "ROUTE_NOT_FOUND",
            Self::RunnableNotFound { .. } => "RUNNABLE_NOT_FOUND",
            Self::PackageNotFound { .. } => "PACKAGE_NOT_FOUND",
            Self::PackagesNotFound { .. } => "PACKAGES_NOT_FOUND",
            Self::AlreadySetup => "ALREADY_SETUP",
            Self::Middleware { .. } => "MIDDLEWARE_ERROR",
            Self::View(_) => "VIEW_ERROR",
            Self::Handler(_) => "HANDLER_ERROR",
            Self::Setup { .. } => "SETUP_ERROR",
        }
    }

    /// Returns true when this error triggers the not-found flow.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.category(), ErrorCategory::NotFound)
    }
}

/// Errors raised while rendering a view.
#[derive(Error, Debug)]
pub enum ViewError {
    /// No template is registered under the view key.
    #[error("Invalid view file path, expected: \"{key}\"")]
    TemplateNotFound {
        /// Template key that was looked up.
        key: String,
    },

    /// No template is registered under the layout key.
    #[error("Invalid layout file path, expected: \"{key}\"")]
    LayoutNotFound {
        /// Layout key that was looked up.
        key: String,
    },

    /// The template itself failed.
    #[error("Template '{key}' failed: {source}")]
    Render {
        /// Template key.
        key: String,
        /// Underlying error.
        #[source]
        source: anyhow::Error,
    },
}

impl ViewError {
    /// Creates a [`ViewError::Render`].
    pub fn render(key: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Render {
            key: key.into(),
            source: source.into(),
        }
    }
}

/// Errors raised by [`Response`](crate::Response) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// `redirect` was called with a status other than 301, 302 or 307.
    #[error("Invalid redirect status specified: {status}")]
    InvalidRedirectStatus {
        /// Offending status.
        status: u16,
    },

    /// A redirect status was sent without going through `redirect`.
    #[error("You cannot send a redirect ({status}) using a regular response")]
    RedirectWithoutLocation {
        /// Offending status.
        status: u16,
    },

    /// A header name or value is not valid HTTP.
    #[error("Invalid header '{name}'")]
    InvalidHeader {
        /// Header name.
        name: String,
    },
}
