//! The before/after bracket around one dispatch.

use caravel_core::{Request, Response};

use crate::error::{MiddlewareError, Phase};
use crate::middleware::Middleware;
use crate::registry::MiddlewareRegistry;

/// Middleware instances of one dispatch.
///
/// Tracks which middleware completed its before-hook; only those get their
/// after-hook, in the order they started.
#[derive(Default)]
pub struct MiddlewareChain {
    started: Vec<(String, Box<dyn Middleware>)>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the before-hooks of `names` in order.
    ///
    /// Unregistered names are skipped. Stops at the first failing hook; the
    /// failed middleware is not considered started.
    pub fn run_before<I, S>(
        &mut self,
        registry: &MiddlewareRegistry,
        names: I,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), MiddlewareError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            let Some(mut middleware) = registry.create(name) else {
                tracing::debug!(middleware = name, "middleware not registered, skipping");
                continue;
            };

            middleware
                .on_before(request, response)
                .map_err(|e| MiddlewareError::new(name, Phase::Before, e))?;
            tracing::trace!(middleware = name, "before hook done");
            self.started.push((name.to_string(), middleware));
        }
        Ok(())
    }

    /// Runs the after-hooks of every started middleware, in start order.
    ///
    /// Every hook runs even if an earlier one fails; the first error is
    /// returned. The chain is drained, so a second call does nothing.
    pub fn run_after(
        &mut self,
        request: &Request,
        response: &mut Response,
    ) -> Result<(), MiddlewareError> {
        let mut first_error = None;
        for (name, mut middleware) in self.started.drain(..) {
            if let Err(e) = middleware.on_after(request, response) {
                tracing::warn!(middleware = %name, error = %e, "after hook failed");
                first_error.get_or_insert(MiddlewareError::new(name, Phase::After, e));
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Names of the started middleware.
    pub fn started(&self) -> Vec<&str> {
        self.started.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns true if no middleware is waiting for its after-hook.
    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("started", &self.started())
            .finish()
    }
}
