//! The dispatch controller.
//!
//! ```text
//! setup ─► route ─► resolve runnable ─► before hooks ─► init/action/finalise ─► after hooks
//!            │              │                 │                  │
//!            ▼              └─────────────────┴──────────────────┴─► error fallback (500)
//!     not-found fallback (404)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use caravel_config::{resource_file, ConfigLoader, RouteLoader};
use caravel_core::{
    normalise_package, AuthSession, CacheAdapter, Config, DispatchError, DispatchResult,
    Environment, ErasedRunnable, MemoryTemplates, NullCache, Request, Response, Runnable,
    RunnableContext, RunnableRegistry, TemplateRenderer, View, ERROR_CLASS, NOT_FOUND_ACTION,
    UNCAUGHT_EXCEPTION_ACTION, DEFAULT_ERROR_PACKAGE,
};
use caravel_middleware::{Middleware, MiddlewareChain, MiddlewareRegistry};
use caravel_router::{MatchResult, Params, RoleProvider, RouteTable, Router, UrlResolutionCache};
use caravel_telemetry::{record_cache_lookup, record_dispatch, DispatchTimer};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::diagnostics::{
    render_diagnostics, APPLICATION_ERROR_BODY, ERROR_TITLE, NOT_FOUND_BODY, NOT_FOUND_TITLE,
};
use crate::package::Package;
use crate::settings::{EnvSettings, ProcessSettings};

/// Lifetime of the cached merged configuration and route table.
pub const SETUP_CACHE_TTL: Duration = Duration::from_secs(86_400);

const CACHE_COMPONENT: &str = "caravel_application";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Why a dispatch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// No route matched; the not-found fallback answered.
    NotFound,
    /// Something failed; the error fallback answered.
    Error,
}

/// How far one request got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// The application was never set up.
    NotSetup,
    /// Set up, nothing routed yet.
    Setup,
    /// A route matched.
    Routed,
    /// The runnable ran and the response is complete.
    Dispatched,
    /// A fallback produced the response.
    Failed(Failure),
}

impl DispatchState {
    /// Label used in logs and metrics.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotSetup => "not_setup",
            Self::Setup => "setup",
            Self::Routed => "routed",
            Self::Dispatched => "dispatched",
            Self::Failed(Failure::NotFound) => "not_found",
            Self::Failed(Failure::Error) => "error",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one dispatch.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// The response to send.
    pub response: Response,
    /// Final state of the request.
    pub state: DispatchState,
    /// The error a fallback answered, if any.
    pub error: Option<DispatchError>,
}

/// Merged configuration and routes, fixed after setup.
#[derive(Debug)]
struct Loaded {
    config: Arc<Config>,
    routes: Arc<RouteTable>,
    urls: Arc<UrlResolutionCache>,
}

/// Builder for [`Application`].
pub struct ApplicationBuilder {
    app_dir: PathBuf,
    packages: IndexMap<String, Package>,
    runnables: RunnableRegistry,
    middleware_names: Vec<String>,
    middleware: MiddlewareRegistry,
    renderer: Arc<dyn TemplateRenderer>,
    cache: Option<Arc<dyn CacheAdapter>>,
    environment: Option<Environment>,
    auth: Option<Arc<AuthSession>>,
    settings: Box<dyn ProcessSettings>,
    error_package: String,
}

impl ApplicationBuilder {
    fn new(app_dir: PathBuf) -> Self {
        Self {
            app_dir,
            packages: IndexMap::new(),
            runnables: RunnableRegistry::new(),
            middleware_names: Vec::new(),
            middleware: MiddlewareRegistry::new(),
            renderer: Arc::new(MemoryTemplates::new()),
            cache: None,
            environment: None,
            auth: None,
            settings: Box::new(EnvSettings),
            error_package: DEFAULT_ERROR_PACKAGE.to_string(),
        }
    }

    /// Registers a package. A later package with the same name replaces it.
    #[must_use]
    pub fn package(mut self, package: Package) -> Self {
        self.packages.insert(package.name().to_string(), package);
        self
    }

    /// Registers runnable `T` as `class` of `package`.
    #[must_use]
    pub fn runnable<T: Runnable + Default>(mut self, package: &str, class: &str) -> Self {
        self.runnables
            .register::<T>(normalise_package(package), class);
        self
    }

    /// Registers a runnable built by `factory`.
    #[must_use]
    pub fn runnable_with<T, F>(mut self, package: &str, class: &str, factory: F) -> Self
    where
        T: Runnable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.runnables
            .register_with(normalise_package(package), class, factory);
        self
    }

    /// Appends `name` to the middleware run around every dispatch.
    ///
    /// Names without a factory are skipped at dispatch time.
    #[must_use]
    pub fn middleware(mut self, name: impl Into<String>) -> Self {
        self.middleware_names.push(name.into());
        self
    }

    /// Makes middleware `name` resolvable.
    #[must_use]
    pub fn middleware_factory<M, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        M: Middleware,
        F: Fn() -> M + Send + Sync + 'static,
    {
        self.middleware.register(name, factory);
        self
    }

    /// Sets the template renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: impl TemplateRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Sets the cache adapter used in production.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn CacheAdapter>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Sets the environment. Defaults to [`Environment::from_env`].
    #[must_use]
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the session the router's role guard reads.
    #[must_use]
    pub fn auth(mut self, auth: Arc<AuthSession>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Sets how `ini.set` entries are applied. Defaults to [`EnvSettings`].
    #[must_use]
    pub fn settings(mut self, settings: impl ProcessSettings + 'static) -> Self {
        self.settings = Box::new(settings);
        self
    }

    /// Sets the package holding the `Error` runnable.
    #[must_use]
    pub fn error_package(mut self, package: &str) -> Self {
        self.error_package = normalise_package(package);
        self
    }

    /// Builds the application. Call [`Application::setup`] before serving.
    #[must_use]
    pub fn build(self) -> Application {
        Application {
            app_dir: self.app_dir,
            packages: self.packages,
            runnables: self.runnables,
            middleware_names: self.middleware_names,
            middleware: self.middleware,
            renderer: self.renderer,
            cache: self.cache.unwrap_or_else(|| Arc::new(NullCache)),
            environment: self.environment.unwrap_or_else(Environment::from_env),
            auth: self.auth,
            settings: self.settings,
            error_package: self.error_package,
            loaded: None,
            applied_settings: Vec::new(),
        }
    }
}

impl fmt::Debug for ApplicationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationBuilder")
            .field("app_dir", &self.app_dir)
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .field("middleware", &self.middleware_names)
            .finish_non_exhaustive()
    }
}

/// The dispatch controller.
///
/// # Example
///
/// ```
/// use caravel::prelude::*;
/// use http::Method;
/// use serde_json::json;
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl Hello {
///     fn greet(&mut self, ctx: &mut RunnableContext, params: &Params) -> HandlerResult {
///         ctx.view_mut().disable();
///         let name = params.get("name").unwrap_or("world").to_string();
///         ctx.response_mut().set_body(format!("Hello, {name}!"));
///         Ok(())
///     }
/// }
///
/// impl Runnable for Hello {
///     fn action(name: &str) -> Option<Action<Self>> {
///         (name == "greet").then_some(Self::greet as Action<Self>)
///     }
/// }
///
/// let mut app = Application::builder("/nonexistent")
///     .environment(Environment::test())
///     .package(Package::inline("Demo").with_routes(json!({
///         "hello": {"path": "/hello/{name}", "handler": "Hello::greet"}
///     })))
///     .runnable::<Hello>("Demo", "Hello")
///     .build();
/// app.setup().unwrap();
///
/// let response = app.run(Request::new(Method::GET, "/hello/ann"));
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), "Hello, ann!");
/// ```
pub struct Application {
    app_dir: PathBuf,
    packages: IndexMap<String, Package>,
    runnables: RunnableRegistry,
    middleware_names: Vec<String>,
    middleware: MiddlewareRegistry,
    renderer: Arc<dyn TemplateRenderer>,
    cache: Arc<dyn CacheAdapter>,
    environment: Environment,
    auth: Option<Arc<AuthSession>>,
    settings: Box<dyn ProcessSettings>,
    error_package: String,
    loaded: Option<Loaded>,
    applied_settings: Vec<(String, String)>,
}

impl Application {
    /// Starts building an application rooted at `app_dir`.
    pub fn builder(app_dir: impl Into<PathBuf>) -> ApplicationBuilder {
        ApplicationBuilder::new(app_dir.into())
    }

    /// Application directory.
    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    /// The environment.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Returns true once [`setup`](Self::setup) has completed.
    pub fn is_setup(&self) -> bool {
        self.loaded.is_some()
    }

    /// Returns true if any middleware name is configured.
    pub fn has_middleware(&self) -> bool {
        !self.middleware_names.is_empty()
    }

    /// Merged configuration, once set up.
    pub fn config(&self) -> Option<&Config> {
        self.loaded.as_ref().map(|loaded| loaded.config.as_ref())
    }

    /// Merged route table, once set up.
    pub fn routes(&self) -> Option<&RouteTable> {
        self.loaded.as_ref().map(|loaded| loaded.routes.as_ref())
    }

    /// Process settings applied by the last setup, in order.
    pub fn applied_settings(&self) -> &[(String, String)] {
        &self.applied_settings
    }

    /// The cache adapter in use.
    pub fn cache(&self) -> &Arc<dyn CacheAdapter> {
        &self.cache
    }

    /// Looks up a registered package.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PackageNotFound`] if no such package exists.
    pub fn get_package(&self, name: &str) -> DispatchResult<&Package> {
        self.packages
            .get(name)
            .or_else(|| self.packages.get(&normalise_package(name)))
            .ok_or_else(|| DispatchError::package_not_found(name))
    }

    /// Replaces the cache adapter.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AlreadySetup`] once setup has run.
    pub fn set_cache_adapter(&mut self, cache: Arc<dyn CacheAdapter>) -> DispatchResult<()> {
        if self.is_setup() {
            return Err(DispatchError::AlreadySetup);
        }
        self.cache = cache;
        Ok(())
    }

    /// Builds the URL of a named route; the name itself before setup.
    pub fn url_for(&self, name: &str, params: &[(&str, Value)]) -> String {
        match &self.loaded {
            Some(loaded) => loaded.urls.resolve(&loaded.routes, name, params),
            None => name.to_string(),
        }
    }

    /// Loads configuration and routes, and applies process settings.
    ///
    /// Outside production the cache is replaced by a [`NullCache`]. In
    /// production a cached configuration or route table is used as is,
    /// without reading any file.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Setup`] when a process setting cannot be
    /// applied. Malformed files are logged and skipped.
    pub fn setup(&mut self) -> DispatchResult<()> {
        if !self.environment.is_production() {
            self.cache = Arc::new(NullCache);
        }

        let config = self.load_config();
        self.apply_settings(&config)?;
        let routes = self.load_routes();

        info!(
            mode = self.environment.mode(),
            packages = self.packages.len(),
            routes = routes.len(),
            invalid_routes = routes.invalid_count(),
            "application set up"
        );

        self.loaded = Some(Loaded {
            config: Arc::new(config),
            routes: Arc::new(routes),
            urls: Arc::new(UrlResolutionCache::new()),
        });
        Ok(())
    }

    /// Dispatches `request` and returns the response.
    pub fn run(&mut self, request: Request) -> Response {
        self.dispatch(request).response
    }

    /// Dispatches `request`, setting the application up first if needed.
    ///
    /// Without any package the application is set up once more; if there is
    /// still no package the error fallback answers.
    pub fn dispatch(&mut self, request: Request) -> DispatchOutcome {
        if self.packages.is_empty() || !self.is_setup() {
            if let Err(error) = self.setup() {
                return self.fail(request, error);
            }
            if self.packages.is_empty() {
                let error = DispatchError::PackagesNotFound {
                    app_dir: self.app_dir.clone(),
                };
                return self.fail(request, error);
            }
        }
        self.handle(request)
    }

    /// Dispatches `request` on an application that is already set up.
    ///
    /// Takes `&self`, so a set-up application can serve from several threads.
    pub fn handle(&self, request: Request) -> DispatchOutcome {
        let Some(loaded) = self.loaded.as_ref() else {
            return self.fail(request, DispatchError::setup("application is not set up"));
        };

        let timer = DispatchTimer::start();
        let request = Arc::new(request);
        let span = info_span!(
            "dispatch",
            request_id = %request.id(),
            http.method = %request.method(),
            http.path = request.path(),
        );
        let _entered = span.enter();

        let router = self.router_for(&request, loaded);
        let mut response = Response::new();

        let (state, error) = match router.get_route() {
            Err(not_found) => {
                let error = DispatchError::from(not_found);
                self.not_found(&request, &router, loaded, &mut response, &error);
                (DispatchState::Failed(Failure::NotFound), Some(error))
            }
            Ok(matched) => {
                let mut chain = MiddlewareChain::new();
                let mut error = self
                    .run_matched(&request, &router, loaded, &matched, &mut chain, &mut response)
                    .err();
                if let Some(error) = &error {
                    self.error(&request, Some(&router), loaded, &mut response, error);
                }

                // After-hooks see the final response, fallback included.
                if let Err(e) = chain.run_after(&request, &mut response) {
                    let after = DispatchError::middleware(e.name, e.source);
                    if error.is_none() {
                        self.error(&request, Some(&router), loaded, &mut response, &after);
                        error = Some(after);
                    }
                }

                match error {
                    None => (DispatchState::Dispatched, None),
                    Some(error) => (DispatchState::Failed(Failure::Error), Some(error)),
                }
            }
        };

        self.finish(&request, response, state, error, timer)
    }

    fn finish(
        &self,
        request: &Request,
        response: Response,
        state: DispatchState,
        error: Option<DispatchError>,
        timer: DispatchTimer,
    ) -> DispatchOutcome {
        let status = response.effective_status().as_u16();
        let elapsed = timer.elapsed();
        record_dispatch(state.as_str(), status, elapsed);

        match &error {
            Some(error) if !error.is_not_found() => warn!(
                outcome = state.as_str(),
                http.status_code = status,
                error_code = error.error_code(),
                error = %error,
                "request failed"
            ),
            _ => info!(
                outcome = state.as_str(),
                http.status_code = status,
                path = request.path(),
                duration_ms = elapsed.as_secs_f64() * 1000.0,
                "request dispatched"
            ),
        }

        DispatchOutcome {
            response,
            state,
            error,
        }
    }

    /// Answers a request that could not be routed at all.
    fn fail(&self, request: Request, error: DispatchError) -> DispatchOutcome {
        let timer = DispatchTimer::start();
        let mut response = Response::new();
        let fallback = Loaded {
            config: Arc::new(Config::new()),
            routes: Arc::new(RouteTable::new()),
            urls: Arc::new(UrlResolutionCache::new()),
        };
        let loaded = self.loaded.as_ref().unwrap_or(&fallback);
        let request = Arc::new(request);

        self.error(&request, None, loaded, &mut response, &error);
        let state = if self.is_setup() {
            DispatchState::Failed(Failure::Error)
        } else {
            DispatchState::NotSetup
        };
        self.finish(&request, response, state, Some(error), timer)
    }

    fn router_for(&self, request: &Request, loaded: &Loaded) -> Router {
        let mut router =
            Router::new(Arc::clone(&loaded.routes)).with_url_cache(Arc::clone(&loaded.urls));
        router.set_method(request.method().as_str());
        router.set_path(request.path());
        if let Some(ip) = request.client_ip() {
            router.set_ip(ip);
        }
        if let Some(auth) = &self.auth {
            router.set_role_provider(Some(Arc::clone(auth) as Arc<dyn RoleProvider>));
        }
        router
    }

    fn context(
        &self,
        request: &Arc<Request>,
        router: Option<&Router>,
        loaded: &Loaded,
        view: View,
        response: Response,
    ) -> RunnableContext {
        let ctx = RunnableContext::new(Arc::clone(request), view)
            .with_response(response)
            .with_environment(self.environment.clone())
            .with_cache(Arc::clone(&self.cache))
            .with_config(Arc::clone(&loaded.config));
        match router {
            Some(router) => ctx.with_router(router.clone()),
            None => ctx,
        }
    }

    fn run_matched(
        &self,
        request: &Arc<Request>,
        router: &Router,
        loaded: &Loaded,
        matched: &MatchResult,
        chain: &mut MiddlewareChain,
        response: &mut Response,
    ) -> DispatchResult<()> {
        let route = &matched.route;
        let package = matched.package_name.as_deref().unwrap_or_default();
        let package = self.get_package(package)?.name().to_string();
        let target = route
            .handler_ref()
            .ok_or_else(|| DispatchError::runnable_not_found(&package, "", ""))?;

        debug!(
            route = route.name(),
            package = %package,
            handler = %target,
            direct_render = route.is_direct_render(),
            "route resolved"
        );

        let mut view = View::new(&package, target.class.as_str(), target.action.as_str());
        if let Some(layout) = route.layout_name() {
            view.set_layout(layout);
        }

        if route.is_direct_render() {
            self.before(chain, request, response)?;
            let mut ctx = self.context(request, Some(router), loaded, view, std::mem::take(response));
            let result = ctx.finalise(self.renderer.as_ref()).map_err(DispatchError::from);
            *response = ctx.into_response();
            return result;
        }

        let factory = self
            .runnables
            .resolve(&package, &target.class, &target.action)?;
        self.before(chain, request, response)?;
        let mut runnable = factory();

        let mut ctx = self.context(request, Some(router), loaded, view, std::mem::take(response));
        let result = self.drive(runnable.as_mut(), &mut ctx, &target.action, &matched.params);
        *response = ctx.into_response();
        result
    }

    fn before(
        &self,
        chain: &mut MiddlewareChain,
        request: &Request,
        response: &mut Response,
    ) -> DispatchResult<()> {
        chain
            .run_before(&self.middleware, &self.middleware_names, request, response)
            .map_err(|e| DispatchError::middleware(e.name, e.source))
    }

    /// Runs init, the action and finalise on a created runnable.
    fn drive(
        &self,
        runnable: &mut dyn ErasedRunnable,
        ctx: &mut RunnableContext,
        action: &str,
        params: &Params,
    ) -> DispatchResult<()> {
        runnable.init(ctx).map_err(DispatchError::handler)?;
        match runnable.invoke(action, ctx, params) {
            Some(result) => result.map_err(DispatchError::handler)?,
            None => {
                return Err(DispatchError::runnable_not_found(
                    ctx.view().package(),
                    ctx.view().class(),
                    action,
                ))
            }
        }
        runnable.finalise(ctx, self.renderer.as_ref())?;
        Ok(())
    }

    /// Runs the conventional `Error` runnable for `action`.
    ///
    /// The error package must be registered, as any other package.
    fn run_error_runnable(
        &self,
        request: &Arc<Request>,
        router: Option<&Router>,
        loaded: &Loaded,
        action: &str,
        params: &Params,
        response: &mut Response,
    ) -> DispatchResult<()> {
        let package = self.get_package(&self.error_package)?.name();
        let mut runnable = self.runnables.create(package, ERROR_CLASS, action)?;
        let view = View::new(package, ERROR_CLASS, action);
        let mut ctx = self.context(request, router, loaded, view, std::mem::take(response));
        let result = self.drive(runnable.as_mut(), &mut ctx, action, params);
        *response = ctx.into_response();
        result
    }

    fn not_found(
        &self,
        request: &Arc<Request>,
        router: &Router,
        loaded: &Loaded,
        response: &mut Response,
        error: &DispatchError,
    ) {
        response.set_status(404);

        if !self.environment.is_production() {
            response.set_header("Content-Type", HTML_CONTENT_TYPE, true);
            response.set_body(render_diagnostics(NOT_FOUND_TITLE, error, request));
            return;
        }

        let params: Params = [("path", request.path())].into_iter().collect();
        if let Err(e) =
            self.run_error_runnable(request, Some(router), loaded, NOT_FOUND_ACTION, &params, response)
        {
            debug!(error = %e, "not-found runnable unavailable, sending minimal page");
            response.set_status(404);
            response.set_header("Content-Type", HTML_CONTENT_TYPE, true);
            response.set_body(NOT_FOUND_BODY);
        }
    }

    fn error(
        &self,
        request: &Arc<Request>,
        router: Option<&Router>,
        loaded: &Loaded,
        response: &mut Response,
        error: &DispatchError,
    ) {
        response.set_status(500);

        if !self.environment.is_production() {
            response.set_header("Content-Type", HTML_CONTENT_TYPE, true);
            response.set_body(render_diagnostics(ERROR_TITLE, error, request));
            return;
        }

        let message = error.to_string();
        let params: Params = [("code", error.error_code()), ("message", message.as_str())]
            .into_iter()
            .collect();
        if let Err(e) = self.run_error_runnable(
            request,
            router,
            loaded,
            UNCAUGHT_EXCEPTION_ACTION,
            &params,
            response,
        ) {
            warn!(error = %e, "error runnable failed, sending minimal page");
            response.set_status(500);
            response.set_header("Content-Type", HTML_CONTENT_TYPE, true);
            response.set_body(APPLICATION_ERROR_BODY);
        }
    }

    fn cache_key(&self, kind: &str) -> String {
        format!("{}_{CACHE_COMPONENT}_{kind}", self.environment.mode())
    }

    fn cached_table(&self, kind: &'static str) -> Option<Value> {
        let cached = self.cache.get(&self.cache_key(kind)).filter(Value::is_object);
        record_cache_lookup(kind, cached.is_some());
        if cached.is_some() {
            debug!(kind, "setup cache hit");
        }
        cached
    }

    fn store_table(&self, kind: &'static str, value: Value) {
        if !self.cache.set(&self.cache_key(kind), value, SETUP_CACHE_TTL) {
            debug!(kind, "setup cache did not store");
        }
    }

    fn load_config(&self) -> Config {
        if let Some(cached) = self.cached_table("config") {
            return Config::from_value(&cached);
        }

        let mut loader = ConfigLoader::new();
        for package in self.packages.values() {
            if let Some(path) = package.config_file() {
                if let Err(e) = loader.merge_file(&path, Some(package.name())) {
                    warn!(path = %path.display(), error = %e, "skipping package configuration");
                }
            }
            if let Some(inline) = package.inline_config() {
                if let Err(e) = loader.merge_value(inline.clone(), Some(package.name())) {
                    warn!(package = package.name(), error = %e, "skipping inline configuration");
                }
            }
        }
        if let Some(path) = resource_file(&self.app_dir, "config") {
            if let Err(e) = loader.merge_file(&path, None) {
                warn!(path = %path.display(), error = %e, "skipping application configuration");
            }
        }

        let config = loader.load();
        self.store_table("config", config.to_value());
        config
    }

    fn apply_settings(&mut self, config: &Config) -> DispatchResult<()> {
        self.applied_settings.clear();
        let Some(settings) = config.ini_settings() else {
            return Ok(());
        };

        for (name, value) in settings {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                other => {
                    warn!(setting = %name, value = %other, "ignoring non-scalar process setting");
                    continue;
                }
            };
            self.settings.apply(name, &value).map_err(|e| {
                DispatchError::setup_with_source(format!("cannot apply process setting '{name}'"), e)
            })?;
            debug!(setting = %name, value = %value, "process setting applied");
            self.applied_settings.push((name.clone(), value));
        }
        Ok(())
    }

    fn load_routes(&self) -> RouteTable {
        if let Some(cached) = self.cached_table("routes") {
            return RouteTable::from_value(&cached);
        }

        let mut loader = RouteLoader::new();
        for package in self.packages.values() {
            if let Some(path) = package.routes_file() {
                if let Err(e) = loader.merge_package_file(&path, package.name()) {
                    warn!(path = %path.display(), error = %e, "skipping package routes");
                }
            }
            if let Some(inline) = package.inline_routes() {
                if let Err(e) = loader.merge_package_value(inline.clone(), package.name()) {
                    warn!(package = package.name(), error = %e, "skipping inline routes");
                }
            }
        }
        if let Some(path) = resource_file(&self.app_dir, "routes") {
            if let Err(e) = loader.merge_override_file(&path) {
                warn!(path = %path.display(), error = %e, "ignoring application route overrides");
            }
        }

        self.store_table("routes", loader.to_value());
        loader.build()
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("app_dir", &self.app_dir)
            .field("environment", &self.environment)
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .field("runnables", &self.runnables)
            .field("middleware", &self.middleware_names)
            .field("is_setup", &self.is_setup())
            .finish_non_exhaustive()
    }
}
