//! Colored terminal output for the release CLI.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Kind of line printed by [`OutputManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line {
    Plain,
    Success,
    Warning,
    Error,
    Verbose,
    /// Sub-item of the previous line, optionally with a list marker
    Item { bulleted: bool },
}

impl Line {
    fn marker(self) -> Option<(&'static str, Color)> {
        match self {
            Line::Plain => None,
            Line::Success => Some(("✓", Color::Green)),
            Line::Warning => Some(("⚠", Color::Yellow)),
            Line::Error => Some(("✗", Color::Red)),
            Line::Verbose => Some(("→", Color::Blue)),
            Line::Item { bulleted: true } => Some(("  -", Color::Cyan)),
            Line::Item { bulleted: false } => Some(("   ", Color::White)),
        }
    }

    fn text_color(self) -> Option<Color> {
        match self {
            Line::Warning => Some(Color::Yellow),
            Line::Error => Some(Color::Red),
            Line::Verbose => Some(Color::White),
            _ => None,
        }
    }
}

/// Write one line of `kind` into `out`
fn render(out: &mut impl WriteColor, kind: Line, message: &str) -> std::io::Result<()> {
    if let Some((marker, color)) = kind.marker() {
        let bold = matches!(kind, Line::Success | Line::Warning | Line::Error);
        out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold))?;
        write!(out, "{} ", marker)?;
        out.reset()?;
    }
    if let Some(color) = kind.text_color() {
        out.set_color(ColorSpec::new().set_fg(Some(color)))?;
    }
    writeln!(out, "{}", message)?;
    out.reset()
}

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    stdout: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn emit(&self, kind: Line, message: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        render(&mut buffer, kind, message)?;
        self.stdout.print(&buffer)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.emit(Line::Success, message)
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.emit(Line::Warning, message)
    }

    /// Print an error message to stderr, even in quiet mode
    pub fn error(&self, message: &str) {
        let stderr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = stderr.buffer();
        if render(&mut buffer, Line::Error, message).is_err() || stderr.print(&buffer).is_err() {
            eprintln!("✗ {}", message);
        }
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> std::io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.emit(Line::Verbose, message)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut buffer = self.stdout.buffer();
        writeln!(buffer)?;
        buffer.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))?;
        writeln!(buffer, "═══ {} ═══", title)?;
        buffer.reset()?;
        self.stdout.print(&buffer)
    }

    /// Print every line of `message` indented under the previous line
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        message
            .lines()
            .try_for_each(|line| self.emit(Line::Item { bulleted: false }, line))
    }

    /// Print a list item (a URL, a stage)
    pub fn bullet(&self, message: &str) -> std::io::Result<()> {
        self.emit(Line::Item { bulleted: true }, message)
    }

    /// Print a plain message
    pub fn println(&self, message: &str) -> std::io::Result<()> {
        self.emit(Line::Plain, message)
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}
