//! Recording outputs for testing.

use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

use crate::output::{ContextTag, Level, MessageFormatter, Output, WrappingFormatter};

/// A leveled message captured by [`RecordingOutput`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    /// Message level.
    pub level: Level,
    /// Title with the context tag applied.
    pub title: String,
    /// Body text.
    pub text: Option<String>,
}

#[derive(Debug, Default)]
struct ProgressLog {
    started_with: Option<usize>,
    advanced: usize,
    descriptions: Vec<String>,
    closed: usize,
}

/// Formatter that records what it is asked to render, then renders plainly.
#[derive(Debug)]
struct RecordingFormatter {
    inner: WrappingFormatter,
    messages: Arc<Mutex<Vec<RecordedMessage>>>,
}

impl MessageFormatter for RecordingFormatter {
    fn render(&self, level: Level, title: &str, text: Option<&str>, spaced: bool) -> String {
        self.messages.lock().push(RecordedMessage {
            level,
            title: title.to_string(),
            text: text.map(str::to_string),
        });
        self.inner.render(level, title, text, spaced)
    }

    fn render_box(&self, level: Level, message: &str, extra: Option<&str>) -> String {
        self.inner.render_box(level, message, extra)
    }
}

/// An [`Output`] that records messages, writes and progress calls.
///
/// Exiting reports panic with `exit requested with code N` instead of
/// ending the process, so tests can use `#[should_panic]`.
#[derive(Debug)]
pub struct RecordingOutput {
    formatter: RecordingFormatter,
    messages: Arc<Mutex<Vec<RecordedMessage>>>,
    writes: Mutex<Vec<String>>,
    progress: Mutex<ProgressLog>,
    context: ContextTag,
}

impl RecordingOutput {
    /// Creates an empty recording output.
    #[must_use]
    pub fn new() -> Self {
        let messages = Arc::new(Mutex::new(Vec::new()));
        Self {
            formatter: RecordingFormatter {
                inner: WrappingFormatter::plain(),
                messages: Arc::clone(&messages),
            },
            messages,
            writes: Mutex::new(Vec::new()),
            progress: Mutex::new(ProgressLog::default()),
            context: ContextTag::default(),
        }
    }

    /// Returns the leveled messages rendered so far.
    #[must_use]
    pub fn messages(&self) -> Vec<RecordedMessage> {
        self.messages.lock().clone()
    }

    /// Returns every rendered string written so far.
    #[must_use]
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().clone()
    }

    /// Returns the total passed to the last `start` call.
    #[must_use]
    pub fn started_with(&self) -> Option<usize> {
        self.progress.lock().started_with
    }

    /// Returns how many times progress advanced.
    #[must_use]
    pub fn advanced(&self) -> usize {
        self.progress.lock().advanced
    }

    /// Returns the progress labels in the order they were set.
    #[must_use]
    pub fn descriptions(&self) -> Vec<String> {
        self.progress.lock().descriptions.clone()
    }

    /// Returns how many times the output was closed.
    #[must_use]
    pub fn closed(&self) -> usize {
        self.progress.lock().closed
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.messages.lock().clear();
        self.writes.lock().clear();
        *self.progress.lock() = ProgressLog::default();
    }
}

impl Default for RecordingOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for RecordingOutput {
    fn write(&self, rendered: &str) {
        self.writes.lock().push(rendered.to_string());
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        &self.formatter
    }

    fn context_tag(&self) -> &ContextTag {
        &self.context
    }

    fn start(&self, total: usize) {
        self.progress.lock().started_with = Some(total);
    }

    fn advance(&self) {
        self.progress.lock().advanced += 1;
    }

    fn set_description(&self, description: &str) {
        self.progress.lock().descriptions.push(description.to_string());
    }

    fn close(&self) {
        self.progress.lock().closed += 1;
    }

    fn terminate(&self, code: i32) -> ! {
        panic!("exit requested with code {code}")
    }
}

/// A cloneable in-memory writer for asserting on written bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the written bytes as text.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
