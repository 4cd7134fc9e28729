//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
///
/// Status messages go to stderr so that [`data`](Self::data) output on
/// stdout can be piped.
pub(crate) struct Output {
    stderr: Term,
    stdout: Term,
    green: Style,
    yellow: Style,
    red: Style,
    dim: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stderr: Term::stderr(),
            stdout: Term::stdout(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            dim: Style::new().dim(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    fn line(&self, msg: &str, style: Option<&Style>) {
        let _ = match style {
            Some(style) => self.stderr.write_line(&style.apply_to(msg).to_string()),
            None => self.stderr.write_line(msg),
        };
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        self.line(msg, None);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        self.line(msg, Some(&self.green));
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        self.line(msg, Some(&self.yellow));
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        self.line(msg, Some(&self.red));
    }

    /// Print a book heading (cyan bold).
    pub(crate) fn heading(&self, msg: &str) {
        self.line(msg, Some(&self.cyan_bold));
    }

    /// Print one table of contents entry, details dimmed.
    pub(crate) fn toc_entry(&self, depth: usize, title: &str, details: &str) {
        let indent = "  ".repeat(depth);
        if details.is_empty() {
            self.line(&format!("{indent}{title}"), None);
        } else {
            let details = self.dim.apply_to(details);
            self.line(&format!("{indent}{title} {details}"), None);
        }
    }

    /// Write machine-readable output to stdout.
    pub(crate) fn data(&self, text: &str) -> std::io::Result<()> {
        self.stdout.write_line(text)
    }
}
