//! Terminal output utilities.
//!
//! Results go to stdout, messages to stderr.

use std::io;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    out: Term,
    err: Term,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Write a result line to stdout.
    pub(crate) fn result(&self, text: &str) -> io::Result<()> {
        self.out.write_line(text)
    }

    /// Print a highlighted result line (cyan bold) to stdout.
    pub(crate) fn highlight(&self, text: &str) -> io::Result<()> {
        self.out
            .write_line(&self.cyan_bold.apply_to(text).to_string())
    }

    /// Print a secondary result line (dim) to stdout.
    pub(crate) fn detail(&self, text: &str) -> io::Result<()> {
        self.out.write_line(&self.dim.apply_to(text).to_string())
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.err.write_line(msg);
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.err.write_line(&self.red.apply_to(msg).to_string());
    }
}
