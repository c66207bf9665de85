//! # floxcore
//!
//! The plugin kernel of the flox project tool.
//!
//! floxcore aggregates plugins into a project context and provides:
//!
//! - **Plugins**: named units contributing stages, variables and commands
//! - **Stage ordering**: a stable priority sort across every plugin's registry
//! - **Settings loading**: a YAML settings file split into the project
//!   section and per-plugin sections, recovered to defaults when broken
//! - **Layered variables**: per-plugin variables where the first registered
//!   plugin wins
//! - **Output**: leveled status messages, context tags and stage progress
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use floxcore::prelude::*;
//!
//! struct GitPlugin {
//!     base: PluginBase,
//! }
//!
//! impl Plugin for GitPlugin {
//!     fn name(&self) -> &str { self.base.name() }
//!     fn stages(&self) -> &StageRegistry { self.base.stages() }
//! }
//!
//! let mut base = PluginBase::for_type::<GitPlugin>();
//! base.stages_mut().add(create_repository, 10);
//!
//! let mut ctx = ProjectContext::new(vec![Box::new(GitPlugin { base })])?
//!     .with_work_dir(std::env::current_dir()?);
//! ctx.load()?;
//!
//! run_stages(&ctx, &ProgressOutput::default())?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod command;
pub mod config;
pub mod context;
pub mod errors;
pub mod events;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod runner;
pub mod stages;
pub mod testing;

pub use errors::{FloxError, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::command::{Command, CommandDispatcher, CommandGroup};
    pub use crate::config::{ContextConfig, DuplicatePolicy};
    pub use crate::context::{Project, ProjectContext, Settings, Variables};
    pub use crate::errors::{FloxError, SettingsError};
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::logging::init_logging;
    pub use crate::output::{ConsoleOutput, Level, Output, ProgressOutput, Report};
    pub use crate::plugin::{ConfigSection, Plugin, PluginBase, VariableMap};
    pub use crate::runner::{run_stages, RunSummary};
    pub use crate::stages::{Stage, StageRegistry, DEFAULT_PRIORITY};
}
