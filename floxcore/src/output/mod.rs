//! Leveled status messages and stage progress.
//!
//! Every component reports through [`Output`]. Implementations decide where
//! text goes; rendering is delegated to a [`MessageFormatter`] handed to the
//! implementation at construction.
//!
//! ```rust,ignore
//! use floxcore::output::{ConsoleOutput, Output, Report};
//!
//! let out = ConsoleOutput::stdout();
//! out.set_context("git");
//! out.success(Report::new("Repository created").text("origin set to github"));
//! out.error(Report::new("Push rejected").exits(1));
//! ```

mod terminal;
mod format;
mod progress;

pub use terminal::ConsoleOutput;
pub use format::{wrap, MessageFormatter, WrappingFormatter};
pub use progress::{Progress, ProgressOutput};

use crate::stages::Stage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// Something finished well.
    Success,
    /// Neutral information.
    Info,
    /// Something needs attention.
    Warning,
    /// Something failed.
    Error,
}

impl Level {
    /// Returns the icon shown before titles.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "\u{2714}",
            Self::Info => "\u{2139}",
            Self::Warning => "\u{26a0}",
            Self::Error => "\u{2718}",
        }
    }

    /// Returns the terminal color for this level.
    #[must_use]
    pub const fn color(self) -> ::console::Color {
        match self {
            Self::Success => ::console::Color::Green,
            Self::Info => ::console::Color::Blue,
            Self::Warning => ::console::Color::Yellow,
            Self::Error => ::console::Color::Red,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A status message with its presentation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    title: String,
    text: Option<String>,
    show: bool,
    spaced: bool,
    exits: Option<i32>,
}

impl Report {
    /// Creates a shown, unspaced report with no body.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: None,
            show: true,
            spaced: false,
            exits: None,
        }
    }

    /// Sets the body text.
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Gates emission. A hidden report writes nothing but still honours
    /// [`Report::exits`].
    #[must_use]
    pub const fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Surrounds the message with blank lines.
    #[must_use]
    pub const fn spaced(mut self) -> Self {
        self.spaced = true;
        self
    }

    /// Terminates the process with `code` after the message is written.
    #[must_use]
    pub const fn exits(mut self, code: i32) -> Self {
        self.exits = Some(code);
        self
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Returns true unless the report is gated off.
    #[must_use]
    pub const fn is_shown(&self) -> bool {
        self.show
    }

    /// Returns true if the message should be surrounded by blank lines.
    #[must_use]
    pub const fn is_spaced(&self) -> bool {
        self.spaced
    }

    /// Returns the requested exit code.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exits
    }
}

impl From<&str> for Report {
    fn from(title: &str) -> Self {
        Self::new(title)
    }
}

impl From<String> for Report {
    fn from(title: String) -> Self {
        Self::new(title)
    }
}

/// The context tag prepended to titles, shared by the implementations.
#[derive(Debug, Default)]
pub struct ContextTag(Mutex<Option<String>>);

impl ContextTag {
    /// Sets the tag.
    pub fn set(&self, name: &str) {
        *self.0.lock() = Some(name.to_string());
    }

    /// Removes the tag.
    pub fn clear(&self) {
        *self.0.lock() = None;
    }

    /// Returns the current tag.
    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.lock().clone()
    }

    /// Prefixes `title` with `[tag] ` when a tag is set.
    #[must_use]
    pub fn apply(&self, title: &str) -> String {
        match self.0.lock().as_deref() {
            Some(tag) => format!("[{tag}] {title}"),
            None => title.to_string(),
        }
    }
}

/// Sink for leveled messages and stage progress.
///
/// All leveled calls funnel through [`Output::report`] and then
/// [`Output::write`]. Progress hooks default to no-ops so plain outputs can
/// be driven by [`Progress`] unchanged. Nothing here returns an error;
/// presentation is best effort.
pub trait Output {
    /// Emits already rendered text.
    fn write(&self, rendered: &str);

    /// Returns the formatting strategy.
    fn formatter(&self) -> &dyn MessageFormatter;

    /// Returns the context tag state.
    fn context_tag(&self) -> &ContextTag;

    /// Tags every following title with `[name]` until changed.
    fn set_context(&self, name: &str) {
        self.context_tag().set(name);
    }

    /// Removes the context tag.
    fn clear_context(&self) {
        self.context_tag().clear();
    }

    /// Called once with the number of stages before progress starts.
    fn start(&self, _total: usize) {}

    /// Called after each stage is processed.
    fn advance(&self) {}

    /// Updates the progress label.
    fn set_description(&self, _description: &str) {}

    /// Finalizes the progress indicator. Must be safe to call repeatedly.
    fn close(&self) {}

    /// Ends the process after an exiting report.
    fn terminate(&self, code: i32) -> ! {
        std::process::exit(code)
    }

    /// Renders and writes a leveled message.
    fn report(&self, level: Level, report: Report) {
        if report.is_shown() {
            let title = self.context_tag().apply(report.title());
            let spaced = report.is_spaced() || report.exit_code().is_some();
            let rendered = self
                .formatter()
                .render(level, &title, report.body(), spaced);
            self.write(&rendered);
        }
        if let Some(code) = report.exit_code() {
            self.close();
            self.terminate(code);
        }
    }

    /// Writes a success message.
    fn success(&self, report: Report) {
        self.report(Level::Success, report);
    }

    /// Writes an informational message.
    fn info(&self, report: Report) {
        self.report(Level::Info, report);
    }

    /// Writes a warning.
    fn warning(&self, report: Report) {
        self.report(Level::Warning, report);
    }

    /// Writes an error.
    fn error(&self, report: Report) {
        self.report(Level::Error, report);
    }

    /// Writes a boxed banner.
    fn message_box(&self, level: Level, message: &str, extra: Option<&str>) {
        let rendered = self.formatter().render_box(level, message, extra);
        self.write(&rendered);
    }

    /// Writes an error banner.
    fn error_box(&self, message: &str, extra: Option<&str>) {
        self.message_box(Level::Error, message, extra);
    }

    /// Writes an info banner.
    fn info_box(&self, message: &str, extra: Option<&str>) {
        self.message_box(Level::Info, message, extra);
    }

    /// Writes a warning banner.
    fn warning_box(&self, message: &str, extra: Option<&str>) {
        self.message_box(Level::Warning, message, extra);
    }

    /// Writes a success banner.
    fn success_box(&self, message: &str, extra: Option<&str>) {
        self.message_box(Level::Success, message, extra);
    }

    /// Iterates `stages` while driving this output's progress indicator.
    fn progress<'a>(&'a self, stages: Vec<&'a Stage>) -> Progress<'a>
    where
        Self: Sized,
    {
        Progress::new(self, stages)
    }
}
