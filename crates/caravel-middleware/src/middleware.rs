//! The middleware contract.

use caravel_core::{Request, Response};

/// A before/after hook pair.
///
/// A fresh instance is created per dispatch, so hooks may keep state between
/// `on_before` and `on_after`. Both hooks see the same request and response
/// the runnable sees; status codes or headers set here are visible downstream.
///
/// # Example
///
/// ```
/// use caravel_core::{Request, Response};
/// use caravel_middleware::Middleware;
///
/// #[derive(Default)]
/// struct NoCache;
///
/// impl Middleware for NoCache {
///     fn on_before(&mut self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     fn on_after(&mut self, _request: &Request, response: &mut Response) -> anyhow::Result<()> {
///         response.set_header("Cache-Control", "no-store", false);
///         Ok(())
///     }
/// }
/// ```
pub trait Middleware: Send + 'static {
    /// Runs before the runnable is created.
    fn on_before(&mut self, request: &Request, response: &mut Response) -> anyhow::Result<()>;

    /// Runs after the response is complete.
    fn on_after(&mut self, _request: &Request, _response: &mut Response) -> anyhow::Result<()> {
        Ok(())
    }
}

type Hook = Box<dyn FnMut(&Request, &mut Response) -> anyhow::Result<()> + Send>;

/// Middleware built from closures.
pub struct FnMiddleware {
    before: Option<Hook>,
    after: Option<Hook>,
}

impl FnMiddleware {
    /// Middleware with only a before-hook.
    pub fn before<F>(hook: F) -> Self
    where
        F: FnMut(&Request, &mut Response) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            before: Some(Box::new(hook)),
            after: None,
        }
    }

    /// Middleware with only an after-hook.
    pub fn after<F>(hook: F) -> Self
    where
        F: FnMut(&Request, &mut Response) -> anyhow::Result<()> + Send + 'static,
    {
        Self {
            before: None,
            after: Some(Box::new(hook)),
        }
    }

    /// Adds an after-hook.
    #[must_use]
    pub fn and_after<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Request, &mut Response) -> anyhow::Result<()> + Send + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for FnMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl Middleware for FnMiddleware {
    fn on_before(&mut self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        match self.before.as_mut() {
            Some(hook) => hook(request, response),
            None => Ok(()),
        }
    }

    fn on_after(&mut self, request: &Request, response: &mut Response) -> anyhow::Result<()> {
        match self.after.as_mut() {
            Some(hook) => hook(request, response),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_fn_middleware_hooks() {
        let mut mw = FnMiddleware::before(|_, res| {
            res.set_status(202);
            Ok(())
        })
        .and_after(|_, res| {
            res.set_body("after");
            Ok(())
        });

        let request = Request::new(Method::GET, "/");
        let mut response = Response::new();
        mw.on_before(&request, &mut response).unwrap();
        mw.on_after(&request, &mut response).unwrap();
        assert_eq!(response.status(), 202);
        assert_eq!(response.body(), "after");
    }

    #[test]
    fn test_fn_middleware_missing_hook_is_noop() {
        let mut mw = FnMiddleware::after(|_, _| anyhow::bail!("nope"));
        let request = Request::new(Method::GET, "/");
        let mut response = Response::new();
        assert!(mw.on_before(&request, &mut response).is_ok());
        assert!(mw.on_after(&request, &mut response).is_err());
        assert!(format!("{mw:?}").contains("after: true"));
    }
}
