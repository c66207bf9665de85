//! Project context management.
//!
//! This module provides:
//! - The settings document loader and its plugin sections
//! - Project identity and the layered variable space
//! - The [`ProjectContext`] tying plugins, settings and stages together

#[cfg(test)]
mod context_tests;
mod project;
mod project_context;
pub mod settings;
mod variables;

pub use project::Project;
pub use project_context::ProjectContext;
pub use settings::{Settings, SettingsDocument, DEFAULT_SETTINGS_FILE, PROJECT_SECTION};
pub use variables::Variables;
