//! Structured diagnostic records.
//!
//! The project context reports load lifecycle and recovered failures
//! through an [`EventSink`] in addition to `tracing`, so hosts and tests
//! can observe them without installing a subscriber.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event types emitted by the kernel.
pub mod event_types {
    /// The settings file was absent.
    pub const SETTINGS_MISSING: &str = "settings.missing";
    /// The settings file was read and parsed.
    pub const SETTINGS_LOADED: &str = "settings.loaded";
    /// Reading or parsing failed; defaults are in effect.
    pub const SETTINGS_LOAD_FAILED: &str = "settings.load_failed";
    /// The variable space was rebuilt.
    pub const VARIABLES_RESOLVED: &str = "variables.resolved";
    /// A stage started running.
    pub const STAGE_STARTED: &str = "stage.started";
    /// A stage finished successfully.
    pub const STAGE_COMPLETED: &str = "stage.completed";
    /// A stage returned an error.
    pub const STAGE_FAILED: &str = "stage.failed";
}
