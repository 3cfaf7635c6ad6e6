//! Where the operator is asked
//!
//! Git runs pre-commit hooks with stdin redirected from `/dev/null`, so the
//! controlling terminal is opened directly when stdin is not a terminal.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, IsTerminal, Write};
use std::time::Duration;

use crate::config::UnattendedPolicy;
use crate::gate::{Confirmation, Operator};

/// Line source for the operator's answer
pub type AnswerInput = Box<dyn BufRead + Send>;

/// Where the question is shown
pub type QuestionOutput = Box<dyn Write + Send>;

/// Confirmation wired to the process's real terminal
pub type TerminalConfirmation = Confirmation<AnswerInput, QuestionOutput>;

/// Chosen input source for the operator prompt
#[derive(Debug, PartialEq, Eq)]
pub enum InputSource<T> {
    /// Standard input is a terminal
    Stdin,
    /// Standard input is redirected but the controlling terminal opened
    ControllingTerminal(T),
    /// Nobody can be asked
    Unattended,
}

/// Pick the input source for the operator prompt
///
/// # Arguments
///
/// * `json` - Machine readable mode, never prompts
/// * `stdin_is_terminal` - Whether standard input is a terminal
/// * `open_tty` - Opens the controlling terminal, only called when needed
///
/// # Returns
///
/// * `InputSource<T>` - Stdin, the opened terminal, or unattended when it cannot be opened
pub fn select_input_source<T>(
    json: bool,
    stdin_is_terminal: bool,
    open_tty: impl FnOnce() -> io::Result<T>,
) -> InputSource<T> {
    if json {
        return InputSource::Unattended;
    }
    if stdin_is_terminal {
        return InputSource::Stdin;
    }
    match open_tty() {
        Ok(tty) => InputSource::ControllingTerminal(tty),
        Err(e) => {
            tracing::debug!(error = %e, "no controlling terminal");
            InputSource::Unattended
        }
    }
}

/// Build the confirmation for this process
///
/// # Arguments
///
/// * `json` - Machine readable mode, never prompts
/// * `timeout` - How long to wait for an answer, `None` waits forever
/// * `policy` - Applied when nobody can be asked
pub fn confirmation(
    json: bool,
    timeout: Option<Duration>,
    policy: UnattendedPolicy,
) -> TerminalConfirmation {
    let source = select_input_source(json, io::stdin().is_terminal(), open_tty);
    tracing::debug!(source = source_name(&source), "operator input selected");

    let (input, prompt) = match source {
        InputSource::Stdin => (
            Box::new(BufReader::new(io::stdin())) as AnswerInput,
            Box::new(io::stdout()) as QuestionOutput,
        ),
        InputSource::ControllingTerminal((reader, writer)) => (
            Box::new(BufReader::new(reader)) as AnswerInput,
            Box::new(writer) as QuestionOutput,
        ),
        InputSource::Unattended => return Confirmation::Unattended(policy),
    };
    Confirmation::Interactive(Operator::new(input, prompt, timeout))
}

fn source_name<T>(source: &InputSource<T>) -> &'static str {
    match source {
        InputSource::Stdin => "stdin",
        InputSource::ControllingTerminal(_) => "tty",
        InputSource::Unattended => "unattended",
    }
}

#[cfg(unix)]
fn open_tty() -> io::Result<(File, File)> {
    let tty = OpenOptions::new().read(true).write(true).open("/dev/tty")?;
    let writer = tty.try_clone()?;
    Ok((tty, writer))
}

#[cfg(windows)]
fn open_tty() -> io::Result<(File, File)> {
    let reader = OpenOptions::new().read(true).write(true).open("CONIN$")?;
    let writer = OpenOptions::new().write(true).open("CONOUT$")?;
    Ok((reader, writer))
}
