//! Configuration loader.
//!
//! Merges flat key/value documents into one [`Config`]. Later files win,
//! while a key keeps the position of its first appearance.

use std::fs;
use std::path::{Path, PathBuf};

use caravel_core::Config;
use serde_json::Value;

use crate::ConfigError;

/// Directory below a package or application that holds resource files.
pub const RESOURCE_DIR: &str = "res";

/// Finds `<dir>/res/<stem>.toml`, falling back to `<dir>/res/<stem>.json`.
pub fn resource_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    let base = dir.join(RESOURCE_DIR);
    ["toml", "json"]
        .iter()
        .map(|ext| base.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

/// Reads and parses a TOML or JSON file, chosen by extension.
pub fn read_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::file_not_found(path));
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    parse_str(&content, &extension)
}

/// Parses `content` as `format` ("toml" or "json").
pub fn parse_str(content: &str, format: &str) -> Result<Value, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        _ => Err(ConfigError::unsupported_format(format)),
    }
}

fn as_table(value: Value, source_name: &str) -> Result<Config, ConfigError> {
    match value {
        Value::Object(_) => Ok(Config::from_value(&value)),
        _ => Err(ConfigError::not_a_table(source_name)),
    }
}

/// Layered configuration loader.
///
/// # Example
///
/// ```
/// use caravel_config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_string(r#""BlogPackage.title" = "Blog""#, "toml", None)
///     .unwrap()
///     .with_string(r#"{"debug": true}"#, "json", None)
///     .unwrap()
///     .load();
///
/// assert_eq!(config.get_str("BlogPackage.title"), Some("Blog"));
/// assert_eq!(config.get_bool("debug"), Some(true));
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: Config,
    files_loaded: usize,
}

impl ConfigLoader {
    /// Create a new, empty configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges a file, keeping only keys that start with `scope`
    /// (case-insensitive) when a scope is given.
    ///
    /// Returns `Ok(false)` when the file does not exist.
    pub fn merge_file(&mut self, path: &Path, scope: Option<&str>) -> Result<bool, ConfigError> {
        if !path.exists() {
            return Ok(false);
        }

        let value = read_file(path)?;
        let config = as_table(value, &path.display().to_string())?;
        self.merge(config, scope);
        self.files_loaded += 1;
        tracing::debug!(path = %path.display(), scope, "configuration file merged");
        Ok(true)
    }

    /// Load configuration from a file that must exist.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !self.merge_file(path, None)? {
            return Err(ConfigError::file_not_found(path));
        }
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        self.merge_file(path.as_ref(), None)?;
        Ok(self)
    }

    /// Load the keys of a file that belong to `scope`.
    pub fn with_scoped_file<P: AsRef<Path>>(
        mut self,
        path: P,
        scope: &str,
    ) -> Result<Self, ConfigError> {
        self.merge_file(path.as_ref(), Some(scope))?;
        Ok(self)
    }

    /// Load configuration from a string in `format` ("toml" or "json").
    pub fn with_string(
        mut self,
        content: &str,
        format: &str,
        scope: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let config = as_table(parse_str(content, format)?, "<string>")?;
        self.merge(config, scope);
        Ok(self)
    }

    /// Merges an already parsed table, scoped like [`merge_file`](Self::merge_file).
    pub fn merge_value(&mut self, value: Value, scope: Option<&str>) -> Result<(), ConfigError> {
        let config = as_table(value, "<value>")?;
        self.merge(config, scope);
        Ok(())
    }

    /// Number of files merged so far.
    #[must_use]
    pub fn files_loaded(&self) -> usize {
        self.files_loaded
    }

    /// Finalize and return the merged configuration.
    #[must_use]
    pub fn load(self) -> Config {
        self.config
    }

    fn merge(&mut self, config: Config, scope: Option<&str>) {
        match scope {
            Some(prefix) => self.config.merge(config.scoped(prefix)),
            None => self.config.merge(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_toml_and_json() {
        assert_eq!(parse_str("a = 1", "toml").unwrap(), json!({"a": 1}));
        assert_eq!(parse_str(r#"{"a": 1}"#, "JSON").unwrap(), json!({"a": 1}));
        assert!(matches!(
            parse_str("a: 1", "yaml"),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
        assert!(matches!(parse_str("a = ", "toml"), Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_with_file_missing() {
        let err = ConfigLoader::new().with_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
        assert!(ConfigLoader::new()
            .with_optional_file("/definitely/not/here.toml")
            .is_ok());
    }

    #[test]
    fn test_scoped_merge() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "config.toml",
            r#"
            "BlogPackage.title" = "Blog"
            "blogpackage.perPage" = 10
            "ShopPackage.currency" = "EUR"
            "#,
        );

        let config = ConfigLoader::new()
            .with_scoped_file(&path, "BlogPackage")
            .unwrap()
            .load();
        assert_eq!(config.len(), 2);
        assert!(config.get("ShopPackage.currency").is_none());
    }

    #[test]
    fn test_later_files_win() {
        let dir = TempDir::new().unwrap();
        let first = write(&dir, "a.toml", "x = 1\ny = 1");
        let second = write(&dir, "b.json", r#"{"y": 2, "z": 2}"#);

        let loader = ConfigLoader::new()
            .with_file(&first)
            .unwrap()
            .with_file(&second)
            .unwrap();
        assert_eq!(loader.files_loaded(), 2);
        let config = loader.load();
        let keys: Vec<_> = config.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
        assert_eq!(config.get_i64("y"), Some(2));
    }

    #[test]
    fn test_non_table_root_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.json", "[1, 2]");
        let err = ConfigLoader::new().with_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NotATable { .. }));
    }

    #[test]
    fn test_merge_value_scoped() {
        let mut loader = ConfigLoader::new();
        loader
            .merge_value(json!({"blogpackage.title": "Blog", "other": 1}), Some("BlogPackage"))
            .unwrap();
        assert!(loader.merge_value(json!("scalar"), None).is_err());

        let config = loader.load();
        assert_eq!(config.get_str("blogpackage.title"), Some("Blog"));
        assert!(config.get("other").is_none());
    }

    #[test]
    fn test_resource_file_prefers_toml() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(RESOURCE_DIR)).unwrap();
        assert!(resource_file(dir.path(), "config").is_none());

        write(&dir, "res/config.json", "{}");
        assert!(resource_file(dir.path(), "config")
            .unwrap()
            .ends_with("res/config.json"));

        write(&dir, "res/config.toml", "");
        assert!(resource_file(dir.path(), "config")
            .unwrap()
            .ends_with("res/config.toml"));
    }
}
