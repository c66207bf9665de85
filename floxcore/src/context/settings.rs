//! Reading and splitting the local settings document.

use crate::errors::SettingsError;
use crate::plugin::ConfigSection;
use serde_json::Value;
use std::path::Path;

/// Default settings file name, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = ".flox";

/// Reserved top-level key holding project identity.
pub const PROJECT_SECTION: &str = "project";

/// The settings document with the `project` section removed.
///
/// Every top-level key is a plugin section. Lookups of absent sections
/// yield an empty mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    document: serde_json::Map<String, Value>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a parsed document.
    #[must_use]
    pub const fn from_document(document: serde_json::Map<String, Value>) -> Self {
        Self { document }
    }

    /// Returns a plugin's section, or an empty one.
    ///
    /// A section that is present but not a mapping is treated as absent.
    #[must_use]
    pub fn section(&self, name: &str) -> ConfigSection {
        match self.document.get(name) {
            Some(Value::Object(section)) => section.clone(),
            Some(Value::Null) | None => ConfigSection::new(),
            Some(other) => {
                tracing::warn!(
                    section = %name,
                    found = value_kind(other),
                    "settings section is not a mapping, ignoring it"
                );
                ConfigSection::new()
            }
        }
    }

    /// Returns a raw top-level value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Returns the top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// Returns the whole document.
    #[must_use]
    pub const fn as_map(&self) -> &serde_json::Map<String, Value> {
        &self.document
    }

    /// Returns true if the document has no sections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.document.is_empty()
    }
}

/// A parsed settings file split into its two parts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDocument {
    /// The reserved `project` section, if present and a mapping.
    pub project: Option<serde_json::Map<String, Value>>,
    /// Everything else.
    pub settings: Settings,
}

/// Reads and parses the settings file at `path`.
///
/// Returns `Ok(None)` when there is no file.
///
/// # Errors
///
/// Returns a [`SettingsError`] when the file cannot be read or parsed.
pub fn read_settings(path: &Path) -> Result<Option<SettingsDocument>, SettingsError> {
    if !path.is_file() {
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_settings(path, &contents).map(Some)
}

/// Parses settings text and splits off the `project` section.
///
/// `path` is only used for error reporting.
///
/// # Errors
///
/// Returns [`SettingsError::Parse`] for invalid YAML and
/// [`SettingsError::NotAMapping`] when the top level is not a mapping.
pub fn parse_settings(path: &Path, contents: &str) -> Result<SettingsDocument, SettingsError> {
    if is_blank_document(contents) {
        return Ok(SettingsDocument::default());
    }

    let value: Value = serde_yaml::from_str(contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut document = match value {
        Value::Object(map) => map,
        Value::Null => return Ok(SettingsDocument::default()),
        other => {
            return Err(SettingsError::NotAMapping {
                path: path.to_path_buf(),
                found: value_kind(&other),
            })
        }
    };

    let project = match document.shift_remove(PROJECT_SECTION) {
        Some(Value::Object(section)) => Some(section),
        Some(Value::Null) | None => None,
        Some(other) => {
            tracing::warn!(
                path = %path.display(),
                found = value_kind(&other),
                "project section is not a mapping, ignoring it"
            );
            None
        }
    };

    Ok(SettingsDocument {
        project,
        settings: Settings::from_document(document),
    })
}

/// True for documents holding only whitespace and comments.
fn is_blank_document(contents: &str) -> bool {
    contents
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
