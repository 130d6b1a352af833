//! Process settings applied from the `ini.set` configuration block.

use anyhow::bail;

/// Applies one process setting.
pub trait ProcessSettings: Send + Sync {
    /// Applies `name = value`.
    fn apply(&self, name: &str, value: &str) -> anyhow::Result<()>;
}

/// Exports each setting as an environment variable of the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSettings;

impl ProcessSettings for EnvSettings {
    fn apply(&self, name: &str, value: &str) -> anyhow::Result<()> {
        if name.is_empty() || name.contains(['=', '\0']) {
            bail!("invalid environment variable name '{name}'");
        }
        if value.contains('\0') {
            bail!("value of '{name}' contains a NUL byte");
        }
        std::env::set_var(name, value);
        Ok(())
    }
}

/// Ignores every setting.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSettings;

impl ProcessSettings for NoopSettings {
    fn apply(&self, _name: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }
}
