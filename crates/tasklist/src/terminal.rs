//! Line-oriented implementations of the app's prompt and view capabilities.

use std::io::{BufRead, Write};

use tasklist_app::{Notice, Prompter, Severity, View};
use tasklist_core::Projection;
use time::OffsetDateTime;
use tracing::warn;

use crate::render::{self, DateStyle};

/// Reads answers line by line from `input` and writes questions to `output`.
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line without its line terminator.
    /// `Ok(None)` means end of input.
    pub fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        match self.read_line(prompt) {
            Ok(answer) => answer,
            Err(err) => {
                warn!(error = %err, "failed to read answer");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn confirm(&mut self, message: &str) -> bool {
        self.ask(&format!("{message} [y/N] "))
            .is_some_and(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn prompt_text(&mut self, message: &str, default: &str) -> Option<String> {
        let answer = self.ask(&format!("{message} [{default}] "))?;
        if answer.trim().is_empty() {
            Some(default.to_owned())
        } else {
            Some(answer)
        }
    }
}

/// Writes notices, and optionally the refreshed table, to `out`.
pub struct TerminalView<W> {
    out: W,
    style: DateStyle,
    redraw: bool,
}

impl<W: Write> TerminalView<W> {
    /// `redraw` controls whether state changes reprint the task table.
    pub const fn new(out: W, style: DateStyle, redraw: bool) -> Self {
        Self { out, style, redraw }
    }

    pub const fn redraws(&self) -> bool {
        self.redraw
    }

    pub const fn style(&self) -> &DateStyle {
        &self.style
    }

    /// Write a block of already rendered output.
    pub fn print(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            warn!(error = %err, "failed to write output");
        }
    }

    #[cfg(test)]
    pub const fn output(&self) -> &W {
        &self.out
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, projection: &Projection<'_>) {
        if self.redraw {
            let table = render::table(projection, &self.style, OffsetDateTime::now_utc());
            self.print(&table);
        }
    }

    fn notify(&mut self, notice: Notice) {
        let line = format!("{} {}", badge(notice.severity), notice.message);
        self.print(&line);
    }
}

const fn badge(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[ok]",
        Severity::Error => "[error]",
        Severity::Warning => "[warn]",
        Severity::Info => "[info]",
    }
}
