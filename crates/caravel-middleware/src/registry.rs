//! Named middleware factories.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::middleware::Middleware;

/// Creates a middleware instance for one dispatch.
pub type MiddlewareFactory = Arc<dyn Fn() -> Box<dyn Middleware> + Send + Sync>;

/// Middleware factories keyed by name.
#[derive(Default, Clone)]
pub struct MiddlewareRegistry {
    factories: IndexMap<String, MiddlewareFactory>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`, replacing any earlier one.
    pub fn register<M, F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        M: Middleware,
        F: Fn() -> M + Send + Sync + 'static,
    {
        let factory: MiddlewareFactory =
            Arc::new(move || -> Box<dyn Middleware> { Box::new(factory()) });
        self.factories.insert(name.into(), factory);
        self
    }

    /// Registers `M` built with `Default`.
    pub fn register_default<M: Middleware + Default>(&mut self, name: impl Into<String>) -> &mut Self {
        self.register(name, M::default)
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Creates a fresh instance of `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Middleware>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered factories.
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

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
