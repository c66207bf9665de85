//! Message rendering strategies.

use super::Level;
use console::{measure_text_width, Style};

/// Turns leveled messages into printable text.
pub trait MessageFormatter {
    /// Renders a titled message with an optional body.
    fn render(&self, level: Level, title: &str, text: Option<&str>, spaced: bool) -> String;

    /// Renders a boxed banner with an optional second paragraph.
    fn render_box(&self, level: Level, message: &str, extra: Option<&str>) -> String;
}

/// Icon-prefixed, word-wrapped rendering with optional color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappingFormatter {
    width: usize,
    indent: usize,
    color: bool,
    terminal_width: Option<usize>,
}

impl Default for WrappingFormatter {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            indent: Self::DEFAULT_INDENT,
            color: console::colors_enabled(),
            terminal_width: console::Term::stdout()
                .size_checked()
                .map(|(_, cols)| usize::from(cols)),
        }
    }
}

impl WrappingFormatter {
    /// Maximum line width, indentation included.
    pub const DEFAULT_WIDTH: usize = 120;
    /// Body indentation.
    pub const DEFAULT_INDENT: usize = 4;

    const BOX_INDENT: usize = 2;

    /// Creates a formatter detecting color support and terminal width.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter without color or terminal detection.
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            indent: Self::DEFAULT_INDENT,
            color: false,
            terminal_width: None,
        }
    }

    /// Sets the maximum line width.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the body indentation.
    #[must_use]
    pub const fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Forces color on or off.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn box_width(&self) -> usize {
        self.terminal_width.map_or(self.width, |cols| cols.min(self.width))
    }

    fn title_style(&self, level: Level) -> Style {
        Style::new()
            .fg(level.color())
            .bold()
            .force_styling(self.color)
    }

    fn box_style(&self, level: Level, bold: bool) -> Style {
        let style = Style::new().bg(level.color()).force_styling(self.color);
        if bold {
            style.bold()
        } else {
            style
        }
    }
}

impl MessageFormatter for WrappingFormatter {
    fn render(&self, level: Level, title: &str, text: Option<&str>, spaced: bool) -> String {
        let heading = format!("{} {}", level.icon(), title.trim());
        let heading = wrap(heading.trim(), self.width, "", "");
        let mut message = self.title_style(level).apply_to(heading).to_string();

        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            let indent = " ".repeat(self.indent);
            message.push('\n');
            message.push_str(&wrap(text, self.width, &indent, &indent));
        }

        if spaced {
            format!("\n{message}\n")
        } else {
            message
        }
    }

    fn render_box(&self, level: Level, message: &str, extra: Option<&str>) -> String {
        let width = self.box_width();
        let indent = " ".repeat(Self::BOX_INDENT);
        let inner = width.saturating_sub(Self::BOX_INDENT);

        let first = format!("{indent}{} ", level.icon());
        let mut lines = vec![String::new()];
        lines.extend(wrap(message, inner, &first, &indent).lines().map(str::to_string));
        if let Some(extra) = extra {
            lines.extend(wrap(extra, inner, &indent, &indent).lines().map(str::to_string));
        }
        lines.push(String::new());

        let mut out = String::from("\n");
        for (i, line) in lines.iter().enumerate() {
            let padded = pad_to(&format!("{line}{indent}"), width);
            out.push_str(&indent);
            out.push_str(&self.box_style(level, i == 1).apply_to(padded).to_string());
            out.push('\n');
        }
        out
    }
}

/// Word-wraps `text` to `width` columns.
///
/// Explicit newlines start new paragraphs. Words longer than a line are
/// never split. Widths are measured in terminal columns.
#[must_use]
pub fn wrap(text: &str, width: usize, initial_indent: &str, subsequent_indent: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut first = true;

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_has_word = false;

        for word in paragraph.split_whitespace() {
            if !line_has_word {
                line = if first { initial_indent } else { subsequent_indent }.to_string();
                line.push_str(word);
                line_has_word = true;
                first = false;
                continue;
            }
            if measure_text_width(&line) + 1 + measure_text_width(word) > width {
                lines.push(std::mem::take(&mut line));
                line = subsequent_indent.to_string();
                line.push_str(word);
            } else {
                line.push(' ');
                line.push_str(word);
            }
        }

        if line_has_word {
            lines.push(line);
        } else {
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

fn pad_to(line: &str, width: usize) -> String {
    let used = measure_text_width(line);
    let mut padded = line.to_string();
    padded.push_str(&" ".repeat(width.saturating_sub(used)));
    padded
}
