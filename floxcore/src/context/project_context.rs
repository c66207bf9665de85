//! The project context: plugins, settings, project identity and the stage
//! pipeline for one working directory.

use super::settings::{read_settings, Settings};
use super::{Project, Variables};
use crate::config::{ContextConfig, DuplicatePolicy};
use crate::errors::{DuplicatePluginError, FloxError, Result};
use crate::events::{event_types, EventSink, LoggingEventSink};
use crate::plugin::Plugin;
use crate::stages::{self, Stage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Aggregates plugins and owns the loaded project state.
///
/// Plugins keep registration order; that order decides both variable
/// precedence and the tie-break between stages of equal priority.
pub struct ProjectContext {
    plugins: Vec<Box<dyn Plugin>>,
    project: Project,
    work_dir: Option<PathBuf>,
    settings: Settings,
    config: ContextConfig,
    event_sink: Arc<dyn EventSink>,
}

impl ProjectContext {
    /// Creates a context with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FloxError::DuplicatePlugin`] if two plugins share a name.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Result<Self> {
        Self::with_config(plugins, ContextConfig::default())
    }

    /// Creates a context with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FloxError::DuplicatePlugin`] if two plugins share a name
    /// and the policy is [`DuplicatePolicy::Reject`], and
    /// [`FloxError::InvalidSettingsFileName`] if the settings file would
    /// resolve outside the working directory.
    pub fn with_config(plugins: Vec<Box<dyn Plugin>>, config: ContextConfig) -> Result<Self> {
        config.validate()?;
        let plugins = resolve_plugins(plugins, config.duplicate_plugins)?;
        tracing::debug!(
            plugins = ?plugins.iter().map(|p| p.name()).collect::<Vec<_>>(),
            "created project context"
        );

        Ok(Self {
            plugins,
            project: Project::new(),
            work_dir: None,
            settings: Settings::new(),
            config,
            event_sink: Arc::new(LoggingEventSink::debug()),
        })
    }

    /// Sets the event sink. Events are logged at debug level by default.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.set_work_dir(work_dir);
        self
    }

    /// Sets the working directory used to locate the settings file.
    pub fn set_work_dir(&mut self, work_dir: impl Into<PathBuf>) {
        self.work_dir = Some(work_dir.into());
    }

    /// Returns the working directory, if set.
    #[must_use]
    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Returns the settings file path: the working directory joined with
    /// the configured file name.
    #[must_use]
    pub fn settings_file_path(&self) -> Option<PathBuf> {
        self.work_dir
            .as_ref()
            .map(|dir| dir.join(&self.config.settings_file_name))
    }

    /// Returns the settings file path relative to the working directory.
    #[must_use]
    pub fn settings_file_local(&self) -> Option<PathBuf> {
        let work_dir = self.work_dir.as_ref()?;
        let path = self.settings_file_path()?;
        path.strip_prefix(work_dir).map(Path::to_path_buf).ok()
    }

    /// Returns the plugins in registration order.
    #[must_use]
    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    /// Resolves a plugin by name, e.g. a stage's owner.
    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins
            .iter()
            .find(|plugin| plugin.name() == name)
            .map(|plugin| &**plugin)
    }

    /// Returns the loaded project.
    #[must_use]
    pub const fn project(&self) -> &Project {
        &self.project
    }

    /// Returns the project variable space.
    #[must_use]
    pub const fn variables(&self) -> &Variables {
        self.project.variables()
    }

    /// Returns the settings document without its `project` section.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns every plugin's stages, stable-sorted by priority.
    #[must_use]
    pub fn stages(&self) -> Vec<&Stage> {
        stages::ordered(self.plugins.iter().map(|plugin| plugin.stages()))
    }

    pub(crate) fn emit(&self, event_type: &str, data: serde_json::Value) {
        self.event_sink.emit(event_type, Some(data));
    }

    /// Loads the settings file and rebuilds the project state.
    ///
    /// Settings, project fields and variables are fully replaced on every
    /// call. A missing or malformed settings file is not an error: the
    /// failure is logged and empty settings are used.
    ///
    /// # Errors
    ///
    /// Returns [`FloxError::WorkDirNotSet`] if no working directory is set.
    pub fn load(&mut self) -> Result<()> {
        let path = self.settings_file_path().ok_or(FloxError::WorkDirNotSet)?;

        self.project.reset();
        self.settings = Settings::new();

        match read_settings(&path) {
            Ok(Some(document)) => {
                tracing::debug!(path = %path.display(), "loaded settings file");
                if let Some(section) = document.project {
                    self.project.apply_section(section);
                }
                self.settings = document.settings;
                self.emit(
                    event_types::SETTINGS_LOADED,
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "sections": self.settings.keys().collect::<Vec<_>>(),
                    }),
                );
            }
            Ok(None) => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                self.emit(
                    event_types::SETTINGS_MISSING,
                    serde_json::json!({ "path": path.display().to_string() }),
                );
            }
            Err(err) => {
                tracing::error!(path = %err.path().display(), error = %err, "failed to load settings");
                self.emit(
                    event_types::SETTINGS_LOAD_FAILED,
                    serde_json::json!({
                        "path": err.path().display().to_string(),
                        "kind": err.kind(),
                        "error": err.to_string(),
                    }),
                );
            }
        }

        let variables = Variables::from_layers(self.plugins.iter().map(|plugin| {
            let section = self.settings.section(plugin.name());
            (plugin.name().to_string(), plugin.load(&section))
        }));
        self.emit(
            event_types::VARIABLES_RESOLVED,
            serde_json::json!({
                "plugins": self.plugin_names(),
                "count": variables.len(),
            }),
        );
        self.project.set_variables(variables);

        Ok(())
    }
}

impl std::fmt::Debug for ProjectContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectContext")
            .field("plugins", &self.plugin_names())
            .field("project", &self.project)
            .field("work_dir", &self.work_dir)
            .field("settings", &self.settings)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Applies the duplicate-name policy, keeping registration order.
fn resolve_plugins(
    plugins: Vec<Box<dyn Plugin>>,
    policy: DuplicatePolicy,
) -> Result<Vec<Box<dyn Plugin>>> {
    let mut resolved: Vec<Box<dyn Plugin>> = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        match resolved.iter().position(|p| p.name() == plugin.name()) {
            None => resolved.push(plugin),
            Some(_) if policy == DuplicatePolicy::Reject => {
                return Err(DuplicatePluginError::new(plugin.name()).into());
            }
            Some(index) => {
                tracing::warn!(plugin = %plugin.name(), "replacing earlier plugin with the same name");
                resolved[index] = plugin;
            }
        }
    }
    Ok(resolved)
}
