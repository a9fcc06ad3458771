//! Terminal output for CLI progress and results.
//!
//! Results always go to stdout. Progress and success lines are suppressed in
//! quiet mode. Errors go to stderr regardless. Markers are colored only when
//! the stream is a terminal.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes user-facing messages.
#[derive(Debug, Clone, Copy)]
pub struct OutputManager {
    quiet: bool,
}

fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn stdout() -> StandardStream {
    StandardStream::stdout(color_choice(io::stdout().is_terminal()))
}

fn stderr() -> StandardStream {
    StandardStream::stderr(color_choice(io::stderr().is_terminal()))
}

/// Writes `marker` in `color`, then `message` uncolored.
fn marked(w: &mut impl WriteColor, marker: &str, color: Color, message: &str) -> io::Result<()> {
    w.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(w, "{marker}")?;
    w.reset()?;
    writeln!(w, " {message}")
}

impl OutputManager {
    /// Creates an output manager.
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Section header.
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut out = stdout();
        writeln!(out)?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, "{title}")?;
        out.reset()?;
        writeln!(out)
    }

    /// Progress step.
    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        marked(&mut stdout(), "→", Color::Cyan, message)
    }

    /// Completed step.
    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        marked(&mut stdout(), "✓", Color::Green, message)
    }

    /// Indented detail line.
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(stdout(), "  {message}")
    }

    /// Error, printed even in quiet mode.
    pub fn error(&self, message: &str) -> io::Result<()> {
        marked(&mut stderr(), "✗", Color::Red, message)
    }

    /// Machine-readable result, printed even in quiet mode. Never colored.
    pub fn result(&self, text: &str) -> io::Result<()> {
        writeln!(io::stdout().lock(), "{text}")
    }
}
