//! The runnable contract and the registry that replaces class lookup.
//!
//! A runnable is a controller: it is created fresh for every dispatch,
//! initialised with the [`RunnableContext`], asked to run one named action
//! and finally asked to finalise (render its view).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use caravel_router::Params;

use crate::context::RunnableContext;
use crate::error::{DispatchError, DispatchResult, HandlerResult, ViewError};
use crate::view::TemplateRenderer;

/// An action method of runnable `T`.
pub type Action<T> = fn(&mut T, &mut RunnableContext, &Params) -> HandlerResult;

/// A controller invoked after a route match.
///
/// # Example
///
/// ```
/// use caravel_core::{Action, HandlerResult, Runnable, RunnableContext};
/// use caravel_router::Params;
///
/// #[derive(Default)]
/// struct Post;
///
/// impl Post {
///     fn show(&mut self, ctx: &mut RunnableContext, params: &Params) -> HandlerResult {
///         ctx.view_mut().set("id", params.get("id").unwrap_or("0"));
///         Ok(())
///     }
/// }
///
/// impl Runnable for Post {
///     fn action(name: &str) -> Option<Action<Self>> {
///         match name {
///             "show" => Some(Self::show),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Runnable: Send + 'static {
    /// Called once before the action.
    fn init(&mut self, _ctx: &mut RunnableContext) -> HandlerResult {
        Ok(())
    }

    /// Looks up an action by name.
    fn action(name: &str) -> Option<Action<Self>>
    where
        Self: Sized;

    /// Called after the action. Renders the view by default.
    fn finalise(
        &mut self,
        ctx: &mut RunnableContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<(), ViewError> {
        ctx.finalise(renderer)
    }
}

/// Object-safe view of a [`Runnable`].
pub trait ErasedRunnable: Send {
    /// See [`Runnable::init`].
    fn init(&mut self, ctx: &mut RunnableContext) -> HandlerResult;

    /// Returns true if `action` exists.
    fn has_action(&self, action: &str) -> bool;

    /// Runs `action`, or returns `None` if it does not exist.
    fn invoke(
        &mut self,
        action: &str,
        ctx: &mut RunnableContext,
        params: &Params,
    ) -> Option<HandlerResult>;

    /// See [`Runnable::finalise`].
    fn finalise(
        &mut self,
        ctx: &mut RunnableContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<(), ViewError>;
}

impl<T: Runnable> ErasedRunnable for T {
    fn init(&mut self, ctx: &mut RunnableContext) -> HandlerResult {
        Runnable::init(self, ctx)
    }

    fn has_action(&self, action: &str) -> bool {
        T::action(action).is_some()
    }

    fn invoke(
        &mut self,
        action: &str,
        ctx: &mut RunnableContext,
        params: &Params,
    ) -> Option<HandlerResult> {
        T::action(action).map(|run| run(self, ctx, params))
    }

    fn finalise(
        &mut self,
        ctx: &mut RunnableContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<(), ViewError> {
        Runnable::finalise(self, ctx, renderer)
    }
}

/// Creates runnable instances.
pub type RunnableFactory = Arc<dyn Fn() -> Box<dyn ErasedRunnable> + Send + Sync>;

/// Runnables registered by `(package, class)`.
///
/// Registration happens at startup; dispatch only reads.
#[derive(Default, Clone)]
pub struct RunnableRegistry {
    factories: HashMap<(String, String), Registered>,
}

#[derive(Clone)]
struct Registered {
    factory: RunnableFactory,
    has_action: fn(&str) -> bool,
}

impl RunnableRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under `package` and `class`, built with `Default`.
    pub fn register<T: Runnable + Default>(
        &mut self,
        package: impl Into<String>,
        class: impl Into<String>,
    ) {
        self.register_with(package, class, || T::default());
    }

    /// Registers a runnable built by `factory`.
    pub fn register_with<T, F>(
        &mut self,
        package: impl Into<String>,
        class: impl Into<String>,
        factory: F,
    ) where
        T: Runnable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let factory: RunnableFactory =
            Arc::new(move || -> Box<dyn ErasedRunnable> { Box::new(factory()) });
        let entry = Registered {
            factory,
            has_action: |action| T::action(action).is_some(),
        };
        self.factories.insert((package.into(), class.into()), entry);
    }

    /// Returns true if `(package, class)` is registered.
    #[must_use]
    pub fn contains(&self, package: &str, class: &str) -> bool {
        self.factories
            .contains_key(&(package.to_string(), class.to_string()))
    }

    /// Finds the factory for `(package, class)` without building anything.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::RunnableNotFound`] if the class is not
    /// registered or has no such action.
    pub fn resolve(
        &self,
        package: &str,
        class: &str,
        action: &str,
    ) -> DispatchResult<&RunnableFactory> {
        match self.factories.get(&(package.to_string(), class.to_string())) {
            Some(entry) if (entry.has_action)(action) => Ok(&entry.factory),
            _ => Err(DispatchError::runnable_not_found(package, class, action)),
        }
    }

    /// Creates a runnable able to run `action`.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub fn create(
        &self,
        package: &str,
        class: &str,
        action: &str,
    ) -> DispatchResult<Box<dyn ErasedRunnable>> {
        self.resolve(package, class, action).map(|factory| factory())
    }

    /// Number of registered runnables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for RunnableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableRegistry")
            .field("runnable_count", &self.factories.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::view::{MemoryTemplates, View};
    use http::Method;

    #[derive(Default)]
    struct Counter {
        calls: u32,
    }

    impl Counter {
        fn bump(&mut self, ctx: &mut RunnableContext, params: &Params) -> HandlerResult {
            self.calls += 1;
            ctx.view_mut().set("calls", self.calls);
            ctx.view_mut().set("by", params.get("by").unwrap_or("1"));
            Ok(())
        }

        fn fail(&mut self, _ctx: &mut RunnableContext, _params: &Params) -> HandlerResult {
            anyhow::bail!("counter broke")
        }
    }

    impl Runnable for Counter {
        fn init(&mut self, ctx: &mut RunnableContext) -> HandlerResult {
            ctx.response_mut().set_header("X-Init", "yes", true);
            Ok(())
        }

        fn action(name: &str) -> Option<Action<Self>> {
            match name {
                "bump" => Some(Self::bump),
                "fail" => Some(Self::fail),
                _ => None,
            }
        }
    }

    fn context() -> RunnableContext {
        RunnableContext::new(
            Arc::new(Request::new(Method::GET, "/")),
            View::new("Demo", "Counter", "bump"),
        )
    }

    #[test]
    fn test_registry_new() {
        let registry = RunnableRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_create_and_invoke() {
        let mut registry = RunnableRegistry::new();
        registry.register::<Counter>("DemoPackage", "Counter");
        assert!(registry.contains("DemoPackage", "Counter"));

        let mut runnable = registry.create("DemoPackage", "Counter", "bump").unwrap();
        let mut ctx = context();
        runnable.init(&mut ctx).unwrap();

        let params: Params = [("by", "5")].into_iter().collect();
        runnable.invoke("bump", &mut ctx, &params).unwrap().unwrap();

        let templates = MemoryTemplates::new().with("DemoPackage/counter/bump", |data| {
            Ok(format!("{}x{}", data.get("calls").unwrap(), data.get_str("by").unwrap()))
        });
        runnable.finalise(&mut ctx, &templates).unwrap();

        let response = ctx.into_response();
        assert_eq!(response.header("X-Init"), Some("yes"));
        assert_eq!(response.body(), "1x5");
    }

    #[test]
    fn test_action_error_is_returned() {
        let mut registry = RunnableRegistry::new();
        registry.register::<Counter>("DemoPackage", "Counter");
        let mut runnable = registry.create("DemoPackage", "Counter", "fail").unwrap();
        let err = runnable
            .invoke("fail", &mut context(), &Params::new())
            .unwrap()
            .unwrap_err();
        assert_eq!(err.to_string(), "counter broke");
    }

    #[test]
    fn test_missing_class_or_action() {
        let mut registry = RunnableRegistry::new();
        registry.register_with("DemoPackage", "Counter", || Counter { calls: 10 });

        let err = registry.create("DemoPackage", "Nope", "bump").err().unwrap();
        assert!(matches!(err, DispatchError::RunnableNotFound { .. }));

        let err = registry.create("DemoPackage", "Counter", "explode").err().unwrap();
        assert_eq!(
            err.to_string(),
            "No such runnable: DemoPackage::Counter::explode"
        );
    }

    #[test]
    fn test_resolve_does_not_build() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let mut registry = RunnableRegistry::new();
        registry.register_with("DemoPackage", "Counter", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Counter::default()
        });

        let factory = registry.resolve("DemoPackage", "Counter", "bump").unwrap();
        assert!(registry.resolve("DemoPackage", "Counter", "explode").is_err());
        assert!(registry.resolve("DemoPackage", "Nope", "bump").is_err());
        assert_eq!(built.load(Ordering::SeqCst), 0);

        let runnable = factory();
        assert!(runnable.has_action("bump"));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fresh_instance_per_create() {
        let mut registry = RunnableRegistry::new();
        registry.register::<Counter>("DemoPackage", "Counter");
        for _ in 0..2 {
            let mut runnable = registry.create("DemoPackage", "Counter", "bump").unwrap();
            let mut ctx = context();
            runnable.invoke("bump", &mut ctx, &Params::new()).unwrap().unwrap();
            assert_eq!(ctx.view().get("calls"), Some(&serde_json::json!(1)));
        }
    }

    #[test]
    fn test_registry_debug() {
        let mut registry = RunnableRegistry::new();
        registry.register::<Counter>("DemoPackage", "Counter");
        let debug = format!("{:?}", registry);
        assert!(debug.contains("runnable_count"));
    }
}
