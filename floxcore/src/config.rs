//! Kernel configuration.

use crate::context::DEFAULT_SETTINGS_FILE;
use crate::errors::{FloxError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// Environment variable overriding the settings file name.
pub const SETTINGS_FILE_ENV: &str = "FLOX_SETTINGS_FILE";

/// What to do when two plugins share a name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail context construction.
    #[default]
    Reject,
    /// The later plugin replaces the earlier one at the earlier position.
    ReplaceEarlier,
}

/// Configuration for a [`crate::context::ProjectContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Settings file name, joined onto the working directory.
    #[serde(default = "default_settings_file_name")]
    pub settings_file_name: String,
    /// Plugin name collision policy.
    #[serde(default)]
    pub duplicate_plugins: DuplicatePolicy,
}

fn default_settings_file_name() -> String {
    DEFAULT_SETTINGS_FILE.to_string()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            settings_file_name: default_settings_file_name(),
            duplicate_plugins: DuplicatePolicy::default(),
        }
    }
}

impl ContextConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        match lookup(SETTINGS_FILE_ENV).filter(|name| !name.trim().is_empty()) {
            Some(name) if is_plain_file_name(&name) => config.settings_file_name = name,
            Some(name) => tracing::warn!(
                name = %name,
                fallback = DEFAULT_SETTINGS_FILE,
                "ignoring {}, not a plain file name",
                SETTINGS_FILE_ENV
            ),
            None => {}
        }
        config
    }

    /// Sets the settings file name.
    ///
    /// The name is checked by [`ContextConfig::validate`] when the project
    /// context is created.
    #[must_use]
    pub fn with_settings_file_name(mut self, name: impl Into<String>) -> Self {
        self.settings_file_name = name.into();
        self
    }

    /// Checks that the settings file resolves inside the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`FloxError::InvalidSettingsFileName`] unless the name is a
    /// single normal path component.
    pub fn validate(&self) -> Result<()> {
        if is_plain_file_name(&self.settings_file_name) {
            Ok(())
        } else {
            Err(FloxError::InvalidSettingsFileName(self.settings_file_name.clone()))
        }
    }

    /// Sets the duplicate plugin policy.
    #[must_use]
    pub const fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_plugins = policy;
        self
    }
}

/// True for a name with exactly one normal component, e.g. `.flox`.
///
/// Absolute paths, `..`, `.` and nested paths are rejected.
pub fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
