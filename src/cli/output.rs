//! Colored terminal output.

use std::io::{self, IsTerminal, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes user-facing progress, honouring `--verbose` and `--quiet`.
///
/// Errors always go to stderr, even when quiet.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
    stdout_color: ColorChoice,
    stderr_color: ColorChoice,
}

impl OutputManager {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let choice = |tty: bool| if tty { ColorChoice::Auto } else { ColorChoice::Never };
        Self {
            verbose,
            quiet,
            stdout_color: choice(io::stdout().is_terminal()),
            stderr_color: choice(io::stderr().is_terminal()),
        }
    }

    fn write(
        &self,
        mut stream: StandardStream,
        color: Option<Color>,
        bold: bool,
        prefix: &str,
        message: &str,
    ) -> io::Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(color).set_bold(bold);
        stream.set_color(&spec)?;
        write!(stream, "{prefix}")?;
        stream.reset()?;
        writeln!(stream, "{message}")
    }

    fn stdout(&self) -> StandardStream {
        StandardStream::stdout(self.stdout_color)
    }

    fn stderr(&self) -> StandardStream {
        StandardStream::stderr(self.stderr_color)
    }

    /// Section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write(self.stdout(), Some(Color::Cyan), true, "==> ", title)
    }

    pub fn progress(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write(self.stdout(), Some(Color::Blue), false, "  → ", message)
    }

    pub fn success(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write(self.stdout(), Some(Color::Green), true, "  ✓ ", message)
    }

    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.write(self.stderr(), Some(Color::Yellow), true, "  ! ", message)
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        self.write(self.stderr(), Some(Color::Red), true, "  ✗ ", message)
    }

    /// Only printed with `--verbose`
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.write(self.stdout(), None, false, "    ", message)
    }

    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(self.stdout(), "    {message}")
    }
}
