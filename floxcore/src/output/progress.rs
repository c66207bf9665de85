//! Progress-bar output and the stage progress iterator.

use super::{ContextTag, MessageFormatter, Output, WrappingFormatter};
use crate::stages::Stage;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use parking_lot::Mutex;
use std::io::{IsTerminal, Write};

/// Bar layout: label, percentage, bar, then `done/total`.
pub const PROGRESS_TEMPLATE: &str = "{msg}: {percent:>3}%|{wide_bar}| {pos}/{len}";

/// Output that keeps a progress bar on stderr and prints messages above it.
///
/// When stderr is not a terminal the bar is hidden and messages go to the
/// fallback writer instead.
pub struct ProgressOutput {
    bar: ProgressBar,
    fallback: Mutex<Box<dyn Write + Send>>,
    formatter: Box<dyn MessageFormatter>,
    context: ContextTag,
}

impl ProgressOutput {
    /// Creates a progress output, hiding the bar on non-terminals.
    #[must_use]
    pub fn new(formatter: Box<dyn MessageFormatter>) -> Self {
        let bar = if std::io::stderr().is_terminal() {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            bar.set_style(
                ProgressStyle::with_template(PROGRESS_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };
        Self::with_bar(bar, Box::new(std::io::stdout()), formatter)
    }

    /// Creates a progress output with a hidden bar writing to `fallback`.
    #[must_use]
    pub fn hidden(fallback: Box<dyn Write + Send>, formatter: Box<dyn MessageFormatter>) -> Self {
        Self::with_bar(ProgressBar::hidden(), fallback, formatter)
    }

    fn with_bar(
        bar: ProgressBar,
        fallback: Box<dyn Write + Send>,
        formatter: Box<dyn MessageFormatter>,
    ) -> Self {
        Self {
            bar,
            fallback: Mutex::new(fallback),
            formatter,
            context: ContextTag::default(),
        }
    }

    /// Returns the underlying bar.
    #[must_use]
    pub const fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl Default for ProgressOutput {
    fn default() -> Self {
        Self::new(Box::new(WrappingFormatter::new()))
    }
}

impl Output for ProgressOutput {
    fn write(&self, rendered: &str) {
        if self.bar.is_hidden() {
            let mut writer = self.fallback.lock();
            if let Err(err) = writeln!(writer, "{rendered}").and_then(|()| writer.flush()) {
                tracing::debug!(error = %err, "failed to write output");
            }
        } else {
            self.bar.println(rendered);
        }
    }

    fn formatter(&self) -> &dyn MessageFormatter {
        self.formatter.as_ref()
    }

    fn context_tag(&self) -> &ContextTag {
        &self.context
    }

    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn set_description(&self, description: &str) {
        self.bar.set_message(description.to_string());
    }

    fn close(&self) {
        if !self.bar.is_finished() {
            self.bar.finish();
        }
    }
}

impl std::fmt::Debug for ProgressOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressOutput")
            .field("position", &self.bar.position())
            .field("length", &self.bar.length())
            .field("context", &self.context.get())
            .finish_non_exhaustive()
    }
}

/// Iterates stages while driving an [`Output`]'s progress hooks.
///
/// The output is started with the stage count on creation and advanced once
/// a yielded stage is done, i.e. on the following `next` call. It is closed
/// when the iterator is exhausted or dropped, whichever happens first.
pub struct Progress<'a> {
    output: &'a dyn Output,
    stages: std::vec::IntoIter<&'a Stage>,
    pending: bool,
    closed: bool,
}

impl<'a> Progress<'a> {
    /// Starts progress over `stages`.
    #[must_use]
    pub fn new(output: &'a dyn Output, stages: Vec<&'a Stage>) -> Self {
        output.start(stages.len());
        Self {
            output,
            stages: stages.into_iter(),
            pending: false,
            closed: false,
        }
    }

    /// Finalizes the indicator early.
    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.output.close();
        }
    }
}

impl<'a> Iterator for Progress<'a> {
    type Item = &'a Stage;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pending {
            self.output.advance();
            self.pending = false;
        }
        match self.stages.next() {
            Some(stage) => {
                self.pending = true;
                Some(stage)
            }
            None => {
                self.close();
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stages.size_hint()
    }
}

impl ExactSizeIterator for Progress<'_> {}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Report;
    use crate::stages::StageRegistry;
    use crate::testing::{RecordingOutput, SharedBuffer};

    fn registry() -> StageRegistry {
        let mut registry = StageRegistry::new("demo");
        registry.add_described(|_, _| Ok(()), 1, "first");
        registry.add_described(|_, _| Ok(()), 2, "second");
        registry.add_described(|_, _| Ok(()), 3, "third");
        registry
    }

    #[test]
    fn test_progress_yields_stages_and_advances() {
        let registry = registry();
        let out = RecordingOutput::new();

        let seen: Vec<_> = out
            .progress(registry.iter().collect())
            .map(|stage| stage.description().to_string())
            .collect();

        assert_eq!(seen, vec!["first", "second", "third"]);
        assert_eq!(out.started_with(), Some(3));
        assert_eq!(out.advanced(), 3);
        assert_eq!(out.closed(), 1);
    }

    #[test]
    fn test_progress_closes_on_drop() {
        let registry = registry();
        let out = RecordingOutput::new();

        {
            let mut progress = Progress::new(&out, registry.iter().collect());
            assert_eq!(progress.len(), 3);
            assert!(progress.next().is_some());
        }

        assert_eq!(out.advanced(), 0);
        assert_eq!(out.closed(), 1);
    }

    #[test]
    fn test_progress_over_plain_output() {
        let registry = registry();
        let buffer = SharedBuffer::new();
        let out = crate::output::ConsoleOutput::new(
            Box::new(buffer.clone()),
            Box::new(WrappingFormatter::plain()),
        );

        let count = Progress::new(&out, registry.iter().collect()).count();
        assert_eq!(count, 3);
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_hidden_progress_output_tracks_position() {
        let registry = registry();
        let buffer = SharedBuffer::new();
        let out = ProgressOutput::hidden(Box::new(buffer.clone()), Box::new(WrappingFormatter::plain()));

        for stage in out.progress(registry.iter().collect()) {
            out.set_description(stage.description());
        }

        assert_eq!(out.bar().length(), Some(3));
        assert_eq!(out.bar().position(), 3);
        assert_eq!(out.bar().message(), "third");
        assert!(out.bar().is_finished());
    }

    #[test]
    fn test_hidden_progress_output_writes_to_fallback() {
        let buffer = SharedBuffer::new();
        let out = ProgressOutput::hidden(Box::new(buffer.clone()), Box::new(WrappingFormatter::plain()));

        out.success(Report::new("Done"));
        out.close();
        out.close();

        assert_eq!(buffer.contents(), "✔ Done\n");
    }
}
