//! Per-request context handed to runnables.
//!
//! A [`RunnableContext`] is what a runnable sees of the world: the request
//! snapshot, the response it is building, its view, and the shared services
//! (environment, cache, router, merged configuration).

use std::sync::Arc;

use caravel_router::Router;
use serde_json::Value;

use crate::cache::{CacheAdapter, NullCache};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::{ResponseError, ViewError};
use crate::request::Request;
use crate::response::Response;
use crate::view::{TemplateRenderer, View};

/// Package holding the conventional error runnable.
pub const DEFAULT_ERROR_PACKAGE: &str = "DefaultPackage";

/// Class name of the conventional error runnable.
pub const ERROR_CLASS: &str = "Error";

/// Action invoked when no route matches.
pub const NOT_FOUND_ACTION: &str = "notFound";

/// Action invoked when dispatch fails.
pub const UNCAUGHT_EXCEPTION_ACTION: &str = "uncaughtException";

/// Everything a runnable can reach during one dispatch.
#[derive(Debug)]
pub struct RunnableContext {
    request: Arc<Request>,
    response: Response,
    view: View,
    environment: Environment,
    cache: Arc<dyn CacheAdapter>,
    router: Option<Router>,
    config: Arc<Config>,
}

impl RunnableContext {
    /// Creates a context with a fresh response, no router, an empty config
    /// and a [`NullCache`].
    pub fn new(request: Arc<Request>, view: View) -> Self {
        Self {
            request,
            response: Response::new(),
            view,
            environment: Environment::default(),
            cache: Arc::new(NullCache),
            router: None,
            config: Arc::new(Config::new()),
        }
    }

    /// Continues with an existing response.
    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the cache adapter.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn CacheAdapter>) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the router used for URL generation.
    #[must_use]
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the merged configuration.
    #[must_use]
    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = config;
        self
    }

    /// The request snapshot.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response being built.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the response.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// The view.
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Mutable access to the view.
    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// The environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// The cache adapter. Never absent: a [`NullCache`] stands in.
    pub fn cache(&self) -> &dyn CacheAdapter {
        self.cache.as_ref()
    }

    /// The router, when the request was routed.
    pub fn router(&self) -> Option<&Router> {
        self.router.as_ref()
    }

    /// The merged configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Looks up a configuration value.
    pub fn config_value(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Builds the URL of a named route, or an empty string without a router.
    pub fn url_for(&self, name: &str, params: &[(&str, Value)]) -> String {
        self.router
            .as_ref()
            .map(|router| router.url_for(name, params))
            .unwrap_or_default()
    }

    /// Redirects to `url` and turns the view off.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError::InvalidRedirectStatus`] unless `status` is
    /// 301, 302 or 307; the response is left untouched in that case.
    pub fn redirect(&mut self, url: impl Into<String>, status: u16) -> Result<(), ResponseError> {
        self.response.redirect(url, status)?;
        self.view.disable();
        Ok(())
    }

    /// Marks the response 404 and points the view at another template.
    pub fn not_found(&mut self, package: &str, class: &str, script: &str) {
        self.response.set_status(404);
        self.view
            .set_package(package)
            .set_class(class)
            .set_script(script);
    }

    /// [`not_found`](Self::not_found) with the conventional error template.
    pub fn not_found_default(&mut self) {
        self.not_found(DEFAULT_ERROR_PACKAGE, ERROR_CLASS, NOT_FOUND_ACTION);
    }

    /// Renders the view into the response body when the view is enabled.
    pub fn finalise(&mut self, renderer: &dyn TemplateRenderer) -> Result<(), ViewError> {
        if let Some(body) = self.view.render(renderer)? {
            self.response.set_body(body);
        }
        Ok(())
    }

    /// Consumes the context and returns the response.
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Consumes the context and returns response and view.
    pub fn into_parts(self) -> (Response, View) {
        (self.response, self.view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::MemoryTemplates;
    use caravel_router::{RouteDefinition, RouteTable};
    use http::Method;
    use serde_json::json;

    fn context() -> RunnableContext {
        let request = Arc::new(Request::new(Method::GET, "/posts/1"));
        RunnableContext::new(request, View::new("Blog", "Post", "show"))
    }

    #[test]
    fn test_defaults() {
        let ctx = context();
        assert_eq!(ctx.response().status(), 200);
        assert!(ctx.environment().is_production());
        assert!(ctx.cache().get("anything").is_none());
        assert!(ctx.router().is_none());
        assert_eq!(ctx.url_for("home", &[]), "");
    }

    #[test]
    fn test_config_value() {
        let config: Config = [("blog.title".to_string(), json!("My blog"))]
            .into_iter()
            .collect();
        let ctx = context().with_config(Arc::new(config));
        assert_eq!(ctx.config_value("blog.title"), Some(&json!("My blog")));
        assert_eq!(ctx.config_value("missing"), None);
    }

    #[test]
    fn test_url_for_with_router() {
        let table: RouteTable = [RouteDefinition::new("post", "/posts/{id}")]
            .into_iter()
            .collect();
        let ctx = context().with_router(Router::new(table));
        assert_eq!(ctx.url_for("post", &[("id", json!(3))]), "/posts/3");
        assert_eq!(ctx.url_for("nope", &[]), "nope");
    }

    #[test]
    fn test_redirect_disables_view() {
        let mut ctx = context();
        ctx.redirect("/login", 302).unwrap();
        assert_eq!(ctx.response().status(), 302);
        assert_eq!(ctx.response().header("Location"), Some("/login"));
        assert!(!ctx.view().is_enabled());
    }

    #[test]
    fn test_redirect_rejects_other_statuses() {
        let mut ctx = context();
        assert!(ctx.redirect("/login", 303).is_err());
        assert_eq!(ctx.response().status(), 200);
        assert!(ctx.view().is_enabled());
    }

    #[test]
    fn test_not_found_repoints_view() {
        let mut ctx = context();
        ctx.not_found_default();
        assert_eq!(ctx.response().status(), 404);
        assert_eq!(ctx.view().template_key(), "DefaultPackage/error/notFound");
    }

    #[test]
    fn test_finalise_renders_into_body() {
        let templates = MemoryTemplates::new().with("BlogPackage/post/show", |_| Ok("post".into()));
        let mut ctx = context();
        ctx.finalise(&templates).unwrap();
        assert_eq!(ctx.response().body(), "post");

        let mut ctx = context();
        ctx.view_mut().disable();
        ctx.response_mut().set_body("kept");
        ctx.finalise(&templates).unwrap();
        assert_eq!(ctx.into_response().body(), "kept");
    }
}
