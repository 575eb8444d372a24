//! Sources of interactive input.
//!
//! The session reads exactly one line per prompt through [`LineSource`].
//! Reads block; nothing else happens while the session waits for a line.

use std::io::{self, BufRead, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Error, Result};

/// A blocking source of input lines.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its line terminator.
    ///
    /// Returns `Ok(None)` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Line editor input for terminals.
///
/// Ctrl-C at the prompt discards the partial line and prompts again; Ctrl-D
/// ends input.
pub struct ReadlineInput {
    editor: DefaultEditor,
}

impl ReadlineInput {
    /// Creates a new line editor.
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_error)?;
        Ok(Self { editor })
    }
}

impl LineSource for ReadlineInput {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => {
                    if !line.is_empty() {
                        let _ = self.editor.add_history_entry(line.as_str());
                    }
                    return Ok(Some(line));
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(readline_error(err)),
            }
        }
    }
}

fn readline_error(err: ReadlineError) -> Error {
    match err {
        ReadlineError::Io(e) => Error::io("failed to read user input", e),
        other => Error::io("failed to read user input", io::Error::other(other.to_string())),
    }
}

/// Line input from any buffered reader, such as piped stdin.
pub struct ReaderInput<R> {
    reader: R,
    echo_prompts: bool,
}

impl<R: BufRead> ReaderInput<R> {
    /// Reads lines from `reader` without printing prompts.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            echo_prompts: false,
        }
    }

    /// Print each prompt to stdout before reading.
    pub fn echo_prompts(mut self, echo: bool) -> Self {
        self.echo_prompts = echo;
        self
    }
}

impl<R: BufRead> LineSource for ReaderInput<R> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        if self.echo_prompts {
            let mut stdout = io::stdout();
            let _ = write!(stdout, "{prompt}");
            let _ = stdout.flush();
        }
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| Error::io("failed to read user input", e))?;
        if read == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }
}
