//! Test fixtures: a configurable plugin and settings file helpers.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::context::DEFAULT_SETTINGS_FILE;
use crate::output::{Output, Report};
use crate::plugin::{ConfigSection, Plugin, PluginBase, VariableMap};
use crate::stages::StageRegistry;

type Loader = Box<dyn Fn(&ConfigSection) -> VariableMap>;

/// A plugin assembled from builder calls.
///
/// Variables added with [`StaticPlugin::with_variable`] are returned by
/// every `load`; a loader, if set, contributes on top of them.
pub struct StaticPlugin {
    base: PluginBase,
    variables: VariableMap,
    loader: Option<Loader>,
}

impl StaticPlugin {
    /// Creates a plugin with no stages or variables.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: PluginBase::named(name),
            variables: VariableMap::new(),
            loader: None,
        }
    }

    /// Adds a fixed variable.
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Sets a function building variables from the plugin's section.
    #[must_use]
    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&ConfigSection) -> VariableMap + 'static,
    {
        self.loader = Some(Box::new(loader));
        self
    }

    /// Exposes every section key as a `<name>_<key>` variable.
    #[must_use]
    pub fn with_prefixed_section(self) -> Self {
        let prefix = self.base.name().to_string();
        self.with_loader(move |section| {
            section
                .iter()
                .map(|(key, value)| (format!("{prefix}_{key}"), value.clone()))
                .collect()
        })
    }

    /// Adds a stage that does nothing.
    #[must_use]
    pub fn with_stage(mut self, priority: i64, description: &str) -> Self {
        self.base
            .stages_mut()
            .add_described(|_, _| Ok(()), priority, description);
        self
    }

    /// Adds a stage that reports its own description as an info message.
    #[must_use]
    pub fn with_reporting_stage(mut self, priority: i64, description: &str) -> Self {
        let title = description.to_string();
        self.base.stages_mut().add_described(
            move |_, out| {
                out.info(Report::new(title.as_str()));
                Ok(())
            },
            priority,
            description,
        );
        self
    }

    /// Adds a stage that fails with `message`.
    #[must_use]
    pub fn with_failing_stage(mut self, priority: i64, description: &str, message: &str) -> Self {
        let message = message.to_string();
        self.base.stages_mut().add_described(
            move |_, _| Err(anyhow::anyhow!("{message}")),
            priority,
            description,
        );
        self
    }
}

impl Plugin for StaticPlugin {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn stages(&self) -> &StageRegistry {
        self.base.stages()
    }

    fn load(&self, config: &ConfigSection) -> VariableMap {
        let mut variables = self.variables.clone();
        if let Some(loader) = &self.loader {
            variables.extend(loader(config));
        }
        variables
    }
}

impl fmt::Debug for StaticPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticPlugin")
            .field("base", &self.base)
            .field("variables", &self.variables)
            .field("loader", &self.loader.is_some())
            .finish()
    }
}

/// Writes `contents` to the default settings file inside `dir`.
pub fn write_settings(dir: &Path, contents: &str) -> io::Result<PathBuf> {
    let path = dir.join(DEFAULT_SETTINGS_FILE);
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_plugin_variables_and_loader() {
        let plugin = StaticPlugin::new("alpha")
            .with_variable("fixed", "yes")
            .with_prefixed_section();

        let mut section = ConfigSection::new();
        section.insert("greeting".to_string(), json!("hi"));
        let variables = plugin.load(&section);

        assert_eq!(variables.get("fixed"), Some(&json!("yes")));
        assert_eq!(variables.get("alpha_greeting"), Some(&json!("hi")));
    }

    #[test]
    fn test_static_plugin_stages() {
        let plugin = StaticPlugin::new("alpha")
            .with_stage(5, "first")
            .with_failing_stage(6, "second", "nope");

        let descriptions: Vec<_> = plugin.stages().iter().map(|s| s.description()).collect();
        assert_eq!(descriptions, vec!["first", "second"]);
        assert!(plugin.stages().iter().all(|s| s.owner() == "alpha"));
    }

    #[test]
    fn test_write_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_settings(dir.path(), "project:\n  id: demo\n").unwrap();

        assert_eq!(path, dir.path().join(".flox"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "project:\n  id: demo\n");
    }
}
