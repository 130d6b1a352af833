//! Views, view data and template rendering.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ViewError;

/// Suffix every package name carries.
pub const PACKAGE_SUFFIX: &str = "Package";

/// Key the layout receives the rendered view under.
pub const CONTENT_KEY: &str = "content";

/// Ordered key/value bag handed to templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewData {
    values: IndexMap<String, Value>,
}

impl ViewData {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value for `key` as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns true if `key` was set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Removes `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Renders a template key against view data.
pub trait TemplateRenderer: Send + Sync {
    /// Renders the template stored under `key`.
    ///
    /// Missing templates must be reported as [`ViewError::TemplateNotFound`].
    fn render(&self, key: &str, data: &ViewData) -> Result<String, ViewError>;

    /// Returns true if a template is stored under `key`.
    fn contains(&self, key: &str) -> bool;
}

type TemplateFn = dyn Fn(&ViewData) -> anyhow::Result<String> + Send + Sync;

/// Template renderer backed by closures.
///
/// # Example
///
/// ```
/// use caravel_core::{MemoryTemplates, TemplateRenderer, ViewData};
///
/// let mut templates = MemoryTemplates::new();
/// templates.insert("BlogPackage/post/show", |data: &ViewData| {
///     Ok(format!("<h1>{}</h1>", data.get_str("title").unwrap_or_default()))
/// });
///
/// let mut data = ViewData::new();
/// data.set("title", "Hello");
/// assert_eq!(
///     templates.render("BlogPackage/post/show", &data).unwrap(),
///     "<h1>Hello</h1>"
/// );
/// ```
#[derive(Default, Clone)]
pub struct MemoryTemplates {
    templates: HashMap<String, Arc<TemplateFn>>,
}

impl MemoryTemplates {
    /// Creates an empty template set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a template under `key`.
    pub fn insert<F>(&mut self, key: impl Into<String>, template: F) -> &mut Self
    where
        F: Fn(&ViewData) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.templates.insert(key.into(), Arc::new(template));
        self
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with<F>(mut self, key: impl Into<String>, template: F) -> Self
    where
        F: Fn(&ViewData) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.insert(key, template);
        self
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if no templates are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl fmt::Debug for MemoryTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.templates.keys().collect();
        keys.sort();
        f.debug_struct("MemoryTemplates")
            .field("keys", &keys)
            .finish()
    }
}

impl TemplateRenderer for MemoryTemplates {
    fn render(&self, key: &str, data: &ViewData) -> Result<String, ViewError> {
        let template = self
            .templates
            .get(key)
            .ok_or_else(|| ViewError::TemplateNotFound {
                key: key.to_string(),
            })?;
        template(data).map_err(|e| ViewError::render(key, e))
    }

    fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }
}

/// Appends `Package` unless the name already ends with it, ignoring case.
#[must_use]
pub fn normalise_package(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(&PACKAGE_SUFFIX.to_ascii_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{PACKAGE_SUFFIX}")
    }
}

fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The view of one request: which template to render, with which data.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    package: String,
    class: String,
    script: String,
    layout: Option<(String, String)>,
    data: ViewData,
    enabled: bool,
}

impl View {
    /// Creates an enabled view for `package`, `class` and `script`.
    pub fn new(
        package: impl AsRef<str>,
        class: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            package: normalise_package(package.as_ref()),
            class: class.into(),
            script: script.into(),
            layout: None,
            data: ViewData::new(),
            enabled: true,
        }
    }

    /// Package name, always ending with `Package`.
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Class part of the template key.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Script part of the template key.
    pub fn script(&self) -> &str {
        &self.script
    }

    /// Layout as `(package, name)`.
    pub fn layout(&self) -> Option<(&str, &str)> {
        self.layout
            .as_ref()
            .map(|(package, name)| (package.as_str(), name.as_str()))
    }

    /// Switches package. A different package clears the layout.
    pub fn set_package(&mut self, package: &str) -> &mut Self {
        let package = normalise_package(package);
        if package != self.package {
            self.layout = None;
        }
        self.package = package;
        self
    }

    /// Sets the class part of the template key.
    pub fn set_class(&mut self, class: impl Into<String>) -> &mut Self {
        self.class = class.into();
        self
    }

    /// Sets the script part of the template key.
    pub fn set_script(&mut self, script: impl Into<String>) -> &mut Self {
        self.script = script.into();
        self
    }

    /// Sets the layout from `"Package::name"` or `"name"`.
    ///
    /// A bare name uses the view's own package. A trailing `.phtml` or
    /// `.html` extension is dropped.
    pub fn set_layout(&mut self, layout: &str) -> &mut Self {
        let (package, name) = match layout.split_once("::") {
            Some((package, name)) => (normalise_package(package), name),
            None => (self.package.clone(), layout),
        };
        let name = name
            .strip_suffix(".phtml")
            .or_else(|| name.strip_suffix(".html"))
            .unwrap_or(name);
        self.layout = Some((package, lcfirst(name)));
        self
    }

    /// Removes the layout.
    pub fn clear_layout(&mut self) -> &mut Self {
        self.layout = None;
        self
    }

    /// Turns rendering on.
    pub fn enable(&mut self) -> &mut Self {
        self.enabled = true;
        self
    }

    /// Turns rendering off.
    pub fn disable(&mut self) -> &mut Self {
        self.enabled = false;
        self
    }

    /// Returns true if the view renders on finalise.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Sets a view variable.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.set(key, value);
        self
    }

    /// Reads a view variable.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// View variables.
    pub fn data(&self) -> &ViewData {
        &self.data
    }

    /// Mutable view variables.
    pub fn data_mut(&mut self) -> &mut ViewData {
        &mut self.data
    }

    /// Template key of the view body.
    pub fn template_key(&self) -> String {
        format!(
            "{}/{}/{}",
            self.package,
            lcfirst(&self.class),
            lcfirst(&self.script)
        )
    }

    /// Template key of the layout, if any.
    pub fn layout_key(&self) -> Option<String> {
        self.layout
            .as_ref()
            .map(|(package, name)| format!("{package}/layout/{name}"))
    }

    /// Renders the view, wrapping it in the layout when one is set.
    ///
    /// Returns `Ok(None)` when the view is disabled.
    pub fn render(&self, renderer: &dyn TemplateRenderer) -> Result<Option<String>, ViewError> {
        if !self.enabled {
            return Ok(None);
        }

        let body = renderer.render(&self.template_key(), &self.data)?;

        let Some(layout_key) = self.layout_key() else {
            return Ok(Some(body));
        };
        if !renderer.contains(&layout_key) {
            return Err(ViewError::LayoutNotFound { key: layout_key });
        }

        let mut data = self.data.clone();
        data.set(CONTENT_KEY, body);
        renderer.render(&layout_key, &data).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> MemoryTemplates {
        MemoryTemplates::new()
            .with("BlogPackage/post/show", |data| {
                Ok(format!("post:{}", data.get_str("title").unwrap_or("?")))
            })
            .with("BlogPackage/layout/main", |data| {
                Ok(format!("[{}]", data.get_str(CONTENT_KEY).unwrap_or_default()))
            })
            .with("SharedPackage/layout/wide", |data| {
                Ok(format!("<<{}>>", data.get_str(CONTENT_KEY).unwrap_or_default()))
            })
            .with("BlogPackage/post/broken", |_| anyhow::bail!("boom"))
    }

    #[test]
    fn test_normalise_package() {
        assert_eq!(normalise_package("Blog"), "BlogPackage");
        assert_eq!(normalise_package("BlogPackage"), "BlogPackage");
        assert_eq!(normalise_package("Blogpackage"), "Blogpackage");
    }

    #[test]
    fn test_template_keys() {
        let view = View::new("Blog", "Post", "Show");
        assert_eq!(view.template_key(), "BlogPackage/post/show");
        assert_eq!(view.layout_key(), None);
    }

    #[test]
    fn test_render_without_layout() {
        let mut view = View::new("Blog", "Post", "show");
        view.set("title", "Hi");
        assert_eq!(view.render(&templates()).unwrap().as_deref(), Some("post:Hi"));
    }

    #[test]
    fn test_render_with_layout() {
        let mut view = View::new("Blog", "Post", "show");
        view.set("title", "Hi").set_layout("Main.phtml");
        assert_eq!(view.layout(), Some(("BlogPackage", "main")));
        assert_eq!(view.render(&templates()).unwrap().as_deref(), Some("[post:Hi]"));
    }

    #[test]
    fn test_layout_from_other_package() {
        let mut view = View::new("Blog", "Post", "show");
        view.set_layout("Shared::wide");
        assert_eq!(
            view.render(&templates()).unwrap().as_deref(),
            Some("<<post:?>>")
        );
    }

    #[test]
    fn test_missing_layout() {
        let mut view = View::new("Blog", "Post", "show");
        view.set_layout("nope");
        let err = view.render(&templates()).unwrap_err();
        assert!(matches!(err, ViewError::LayoutNotFound { ref key } if key == "BlogPackage/layout/nope"));
    }

    #[test]
    fn test_missing_template_and_failing_template() {
        let view = View::new("Blog", "Post", "missing");
        assert!(matches!(
            view.render(&templates()).unwrap_err(),
            ViewError::TemplateNotFound { .. }
        ));

        let view = View::new("Blog", "Post", "broken");
        let err = view.render(&templates()).unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_disabled_view_renders_nothing() {
        let mut view = View::new("Blog", "Post", "missing");
        view.disable();
        assert_eq!(view.render(&templates()).unwrap(), None);
        view.enable();
        assert!(view.is_enabled());
    }

    #[test]
    fn test_changing_package_clears_layout() {
        let mut view = View::new("Blog", "Post", "show");
        view.set_layout("main");
        view.set_package("BlogPackage");
        assert!(view.layout().is_some());
        view.set_package("Shop");
        assert!(view.layout().is_none());
        assert_eq!(view.package(), "ShopPackage");
    }

    #[test]
    fn test_view_data_order() {
        let mut data = ViewData::new();
        data.set("b", 1).set("a", 2).set("b", 3);
        let keys: Vec<_> = data.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(data.get("b"), Some(&Value::from(3)));
        assert_eq!(data.remove("b"), Some(Value::from(3)));
        assert_eq!(data.len(), 1);
    }
}
