// user_interaction.rs
use std::io::{self, BufRead, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::{CliError, CliResult};

pub const BOLD: (&str, &str) = ("\x1b[1m", "\x1b[22m");
pub const ITALIC: (&str, &str) = ("\x1b[3m", "\x1b[23m");
pub const FG_RED: (&str, &str) = ("\x1b[31m", "\x1b[39m");
pub const FG_GREEN: (&str, &str) = ("\x1b[32m", "\x1b[39m");
pub const FG_CYAN: (&str, &str) = ("\x1b[36m", "\x1b[39m");

/// Wraps `text` in every style, closing them in reverse order.
pub fn term_format(text: &str, styles: &[(&str, &str)]) -> String {
    let open: String = styles.iter().map(|(start, _)| *start).collect();
    let close: String = styles.iter().rev().map(|(_, end)| *end).collect();
    format!("{open}{text}{close}")
}

/// Source of user input lines. The returned line carries no terminator.
///
/// End of input and Ctrl-C are reported as [`CliError::Quit`].
pub trait Prompt {
    fn read_line(&mut self, prompt: &str) -> CliResult<String>;
}

/// Line editor with history, for interactive terminals.
pub struct EditorPrompt {
    editor: DefaultEditor,
}

impl EditorPrompt {
    pub fn new() -> CliResult<Self> {
        let editor = DefaultEditor::new().map_err(|err| CliError::Input(err.to_string()))?;
        Ok(Self { editor })
    }
}

impl Prompt for EditorPrompt {
    fn read_line(&mut self, prompt: &str) -> CliResult<String> {
        // Input is echoed green, like the rest of the shell's answers.
        let styled = format!("{prompt}{}", FG_GREEN.0);
        let result = self.editor.readline(&styled);
        print!("{}", FG_GREEN.1);
        match result {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(line)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Err(CliError::Quit),
            Err(err) => Err(CliError::Input(err.to_string())),
        }
    }
}

/// Plain buffered reader, used when stdin is piped.
pub struct LinePrompt<R, W> {
    input: R,
    echo: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, echo: W) -> Self {
        Self { input, echo }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn read_line(&mut self, prompt: &str) -> CliResult<String> {
        write!(self.echo, "{prompt}")?;
        self.echo.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(CliError::Quit);
        }
        // Piped answers are not echoed by a terminal; keep the transcript readable.
        writeln!(self.echo)?;
        let trimmed = line.strip_suffix('\n').unwrap_or(&line);
        let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
        Ok(trimmed.to_string())
    }
}

/// Prints an instruction line in cyan.
pub fn print_insight<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{}", term_format(message, &[FG_CYAN]))
}

/// Prints `ERROR! <message>` in bold red, framed by blank lines.
pub fn throw_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        term_format(&format!("\nERROR! {message}\n"), &[BOLD, FG_RED])
    )
}

pub fn clear_screen<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\x1b[2J")
}
