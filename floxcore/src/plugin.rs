//! The plugin contract.
//!
//! A plugin is a named capability unit. It owns a [`StageRegistry`], turns
//! its section of the settings document into project variables, and can
//! expose commands to the dispatch layer. Plugins do not know about the
//! dispatcher; [`crate::command::CommandDispatcher`] references them.

use crate::command::Command;
use crate::stages::StageRegistry;

/// A plugin's section of the settings document.
pub type ConfigSection = serde_json::Map<String, serde_json::Value>;

/// Variables contributed by one plugin.
pub type VariableMap = serde_json::Map<String, serde_json::Value>;

/// A named unit that contributes stages and variables to a project.
pub trait Plugin {
    /// Returns the plugin name. Must be unique within the active set.
    fn name(&self) -> &str;

    /// Returns the stages this plugin registered during construction.
    fn stages(&self) -> &StageRegistry;

    /// Builds this plugin's variables from its configuration section.
    ///
    /// `config` is empty when the settings document has no section for
    /// the plugin.
    fn load(&self, config: &ConfigSection) -> VariableMap {
        let _ = config;
        VariableMap::new()
    }

    /// Commands exposed to the dispatch layer.
    fn commands(&self) -> Vec<Command> {
        Vec::new()
    }
}

/// Derives a plugin name from a type name.
///
/// Takes the last path segment, lowercases it and removes every `plugin`
/// substring, so `GitHubPlugin` becomes `github`. A type named just
/// `Plugin` keeps its lowercased name.
#[must_use]
pub fn derive_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    let short = path.rsplit("::").next().unwrap_or(path).to_lowercase();
    let stripped = short.replace("plugin", "");
    if stripped.is_empty() {
        short
    } else {
        stripped
    }
}

/// Name and stage storage shared by most plugin implementations.
///
/// Embed it and forward [`Plugin::name`] and [`Plugin::stages`] to it.
#[derive(Debug)]
pub struct PluginBase {
    name: String,
    stages: StageRegistry,
}

impl PluginBase {
    /// Creates a base named after the plugin type `T`.
    #[must_use]
    pub fn for_type<T: ?Sized>() -> Self {
        Self::named(derive_name::<T>())
    }

    /// Creates a base with an explicit name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            stages: StageRegistry::new(&name),
            name,
        }
    }

    /// Returns the plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stage registry.
    #[must_use]
    pub const fn stages(&self) -> &StageRegistry {
        &self.stages
    }

    /// Returns the stage registry for registration.
    pub fn stages_mut(&mut self) -> &mut StageRegistry {
        &mut self.stages
    }
}
