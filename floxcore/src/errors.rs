//! Error types for the floxcore kernel.
//!
//! Only structural failures surface as [`FloxError`]. Problems with the
//! optional settings document are captured as [`SettingsError`], reported
//! through the logging channel and never returned from `load()`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for floxcore operations.
#[derive(Debug, Error)]
pub enum FloxError {
    /// `load()` was called before a working directory was set.
    #[error("working directory is not set; call `set_work_dir` before `load`")]
    WorkDirNotSet,

    /// The configured settings file name would resolve outside the
    /// working directory.
    #[error("settings file name '{0}' must be a single file name inside the working directory")]
    InvalidSettingsFileName(String),

    /// Two plugins in the active set share a name.
    #[error("{0}")]
    DuplicatePlugin(#[from] DuplicatePluginError),

    /// No command group or command matched a dispatch request.
    #[error("{0}")]
    UnknownCommand(#[from] UnknownCommandError),

    /// A stage action returned an error.
    #[error("{0}")]
    StageFailed(#[from] StageFailedError),

    /// A command handler returned an error.
    #[error("command '{group} {command}' failed: {source}")]
    CommandFailed {
        /// The command group (plugin) name.
        group: String,
        /// The command name.
        command: String,
        /// The underlying failure.
        #[source]
        source: anyhow::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error raised when a plugin name is registered twice.
#[derive(Debug, Clone, Error)]
#[error("plugin name '{name}' is already registered")]
pub struct DuplicatePluginError {
    /// The colliding plugin name.
    pub name: String,
}

impl DuplicatePluginError {
    /// Creates a new duplicate plugin error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error raised when a dispatch request names an unknown group or command.
#[derive(Debug, Clone, Error)]
#[error("unknown command '{group}{}'", command.as_deref().map(|c| format!(" {c}")).unwrap_or_default())]
pub struct UnknownCommandError {
    /// The requested group.
    pub group: String,
    /// The requested command, if the group itself was found.
    pub command: Option<String>,
}

impl UnknownCommandError {
    /// The group does not exist.
    #[must_use]
    pub fn group(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            command: None,
        }
    }

    /// The group exists but has no such command.
    #[must_use]
    pub fn command(group: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            command: Some(command.into()),
        }
    }
}

/// Error raised when a stage action fails during a run.
#[derive(Debug, Error)]
#[error("stage '{description}' of plugin '{owner}' failed: {source}")]
pub struct StageFailedError {
    /// Name of the plugin that registered the stage.
    pub owner: String,
    /// The stage description.
    pub description: String,
    /// The underlying failure.
    #[source]
    pub source: anyhow::Error,
}

impl StageFailedError {
    /// Creates a new stage failure.
    #[must_use]
    pub fn new(owner: impl Into<String>, description: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            owner: owner.into(),
            description: description.into(),
            source,
        }
    }
}

/// Recoverable problems with the settings document.
///
/// These never escape `ProjectContext::load`; they are logged and the
/// settings fall back to their empty default.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("failed to read settings file {}: {source}", path.display())]
    Read {
        /// The settings file path.
        path: PathBuf,
        /// The IO failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("failed to parse settings file {}: {source}", path.display())]
    Parse {
        /// The settings file path.
        path: PathBuf,
        /// The parser failure.
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed but its top level is not a mapping.
    #[error("settings file {} must contain a mapping at the top level, found {found}", path.display())]
    NotAMapping {
        /// The settings file path.
        path: PathBuf,
        /// The kind of value found instead.
        found: &'static str,
    },
}

impl SettingsError {
    /// Returns the settings file path the error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::NotAMapping { path, .. } => path,
        }
    }

    /// Short machine-readable kind, used in event records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "read",
            Self::Parse { .. } => "parse",
            Self::NotAMapping { .. } => "not_a_mapping",
        }
    }
}

/// Result alias for floxcore operations.
pub type Result<T, E = FloxError> = std::result::Result<T, E>;
