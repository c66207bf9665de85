//! Plain line-oriented output.

use super::{ContextTag, MessageFormatter, Output, WrappingFormatter};
use parking_lot::Mutex;
use std::io::Write;

/// Writes rendered messages line by line to a writer, stdout by default.
///
/// Progress hooks are no-ops.
pub struct ConsoleOutput {
    writer: Mutex<Box<dyn Write + Send>>,
    formatter: Box<dyn MessageFormatter>,
    context: ContextTag,
}

impl ConsoleOutput {
    /// Creates an output writing to `writer` through `formatter`.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>, formatter: Box<dyn MessageFormatter>) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter,
            context: ContextTag::default(),
        }
    }

    /// Creates an output on stdout with the default formatter.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()), Box::new(WrappingFormatter::new()))
    }
}

impl Output for ConsoleOutput {
    fn write(&self, rendered: &str) {
        let mut writer = self.writer.lock();
        if let Err(err) = writeln!(writer, "{rendered}").and_then(|()| writer.flush()) {
            tracing::debug!(error = %err, "failed to write output");
        }
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    fn context_tag(&self) -> &ContextTag {
        &self.context
    }
}

impl std::fmt::Debug for ConsoleOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleOutput")
            .field("context", &self.context.get())
            .finish_non_exhaustive()
    }
}
