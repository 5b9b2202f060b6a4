//! Prompt acquisition
//!
//! Sources, in order: the positional argument, piped stdin appended after
//! it, and finally an interactive line when both are empty.

use crate::errors::{Result, SayError};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::{IsTerminal, Read};

const INTERACTIVE_PROMPT: &str = "Enter prompt: ";

/// Join the argument and piped input into one prompt
///
/// Piped text goes after the argument on its own line, so
/// `llmsay "Summarize:" < notes.txt` reads naturally.
pub fn compose(arg: Option<&str>, piped: Option<&str>) -> String {
    let arg = arg.map(str::trim).unwrap_or("");
    let piped = piped.map(str::trim).unwrap_or("");

    match (arg.is_empty(), piped.is_empty()) {
        (false, false) => format!("{}\n{}", arg, piped),
        (false, true) => arg.to_string(),
        (true, false) => piped.to_string(),
        (true, true) => String::new(),
    }
}

/// Read all of stdin when it is a pipe or file rather than a terminal
pub fn read_piped_stdin() -> Result<Option<String>> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

/// Ask for a single line on the terminal
///
/// Ctrl-C and Ctrl-D yield an empty prompt.
pub fn ask_interactive() -> Result<String> {
    let mut editor = DefaultEditor::new().map_err(readline_error)?;
    match editor.readline(INTERACTIVE_PROMPT) {
        Ok(line) => Ok(line.trim().to_string()),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
        Err(err) => Err(readline_error(err)),
    }
}

/// Gather the prompt from every source; an empty result is an error
pub fn acquire(arg: Option<&str>) -> Result<String> {
    let piped = read_piped_stdin()?;
    let mut prompt = compose(arg, piped.as_deref());

    if prompt.is_empty() && std::io::stdin().is_terminal() {
        prompt = ask_interactive()?;
    }

    if prompt.is_empty() {
        return Err(SayError::Config("Prompt is empty".to_string()));
    }

    tracing::debug!(chars = prompt.chars().count(), "prompt acquired");
    Ok(prompt)
}

fn readline_error(err: ReadlineError) -> SayError {
    SayError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to read prompt: {}", err),
    ))
}
