//! Decision gate for review feedback
//!
//! Feedback containing [`CRITICAL_MARKER`] blocks the commit unless the
//! operator is asked and policy lets a confirmation through.

use serde::Serialize;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;

use crate::config::UnattendedPolicy;
use crate::error::Result;

/// Literal substring marking a critical finding
pub const CRITICAL_MARKER: &str = "[CRITICAL]";

/// Question shown to the operator when a critical finding is reported
pub const CONFIRM_QUESTION: &str = "Do you want to proceed with the commit? (y/n) ";

/// Classification of the feedback text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clear,
    Critical,
}

/// Final outcome of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// No critical marker
    Approved,
    /// Operator declined, or did not answer
    Aborted,
    /// Critical finding with no way through: unattended, or confirmation not honored
    Blocked,
    /// Critical finding let through by confirmation or unattended policy
    Overridden,
}

impl Decision {
    /// Process exit status for this decision
    pub fn exit_code(self) -> u8 {
        match self {
            Decision::Approved | Decision::Overridden => 0,
            Decision::Aborted | Decision::Blocked => 1,
        }
    }
}

/// The person at the terminal: where the answer is read and the question shown
pub struct Operator<R, P> {
    input: R,
    prompt: P,
    timeout: Option<Duration>,
}

impl<R, P> Operator<R, P> {
    /// # Arguments
    ///
    /// * `input` - Line source for the answer, read on a detached thread
    /// * `prompt` - Where the question is written
    /// * `timeout` - How long to wait for an answer, `None` waits forever
    pub fn new(input: R, prompt: P, timeout: Option<Duration>) -> Self {
        Self {
            input,
            prompt,
            timeout,
        }
    }
}

/// How the operator is consulted about a critical finding
pub enum Confirmation<R, P> {
    /// Ask the operator
    Interactive(Operator<R, P>),
    /// Nobody to ask, apply the policy
    Unattended(UnattendedPolicy),
}

/// Classify feedback by the presence of the critical marker
///
/// # Example
///
/// ```
/// use claude_review::gate::{assess, Verdict};
///
/// assert_eq!(assess("Looks good to commit."), Verdict::Clear);
/// assert_eq!(assess("[CRITICAL] SQL injection in login"), Verdict::Critical);
/// ```
pub fn assess(feedback: &str) -> Verdict {
    if feedback.contains(CRITICAL_MARKER) {
        Verdict::Critical
    } else {
        Verdict::Clear
    }
}

/// Whether an answer line counts as "yes"
///
/// Only `y`, in either case, is affirmative. Surrounding whitespace is not
/// trimmed beyond the line terminator.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim_end_matches(['\r', '\n']).to_lowercase() == "y"
}

/// Runs once per invocation on the review feedback
pub struct Gate<R, P> {
    confirmation: Confirmation<R, P>,
    honor_confirmation: bool,
}

impl<R, P> Gate<R, P>
where
    R: BufRead + Send + 'static,
    P: Write,
{
    pub fn new(confirmation: Confirmation<R, P>, honor_confirmation: bool) -> Self {
        Self {
            confirmation,
            honor_confirmation,
        }
    }

    /// Decide whether the commit may proceed, printing the outcome to `out`
    ///
    /// # Errors
    ///
    /// * Writing to `out` or to the operator's prompt fails
    /// * Reading the operator's answer fails
    pub async fn decide<W: Write>(self, feedback: &str, out: &mut W) -> Result<Decision> {
        if assess(feedback) == Verdict::Clear {
            writeln!(out, "\nCommit approved. Committing...")?;
            return Ok(Decision::Approved);
        }

        writeln!(
            out,
            "\nCritical issues found. Please address them before committing."
        )?;
        out.flush()?;

        let decision = match self.confirmation {
            Confirmation::Unattended(UnattendedPolicy::Block) => {
                writeln!(out, "\nNo terminal available to confirm. Commit blocked.")?;
                Decision::Blocked
            }
            Confirmation::Unattended(UnattendedPolicy::Allow) => {
                writeln!(
                    out,
                    "\nNo terminal available to confirm. Commit allowed by configuration."
                )?;
                Decision::Overridden
            }
            Confirmation::Interactive(operator) => {
                if !ask(operator).await? {
                    writeln!(out, "\nCommit aborted.")?;
                    Decision::Aborted
                } else if self.honor_confirmation {
                    writeln!(out, "\nProceeding with commit at operator's request.")?;
                    Decision::Overridden
                } else {
                    writeln!(
                        out,
                        "\nCommit blocked. Use `git commit --no-verify` to skip the review."
                    )?;
                    Decision::Blocked
                }
            }
        };

        tracing::info!(?decision, "critical finding handled");
        Ok(decision)
    }
}

/// Ask the question and wait for one line
///
/// The blocking read runs on a thread that is never joined, so a timed out
/// read cannot keep the process alive. EOF and timeout both count as "no".
async fn ask<R, P>(operator: Operator<R, P>) -> Result<bool>
where
    R: BufRead + Send + 'static,
    P: Write,
{
    let Operator {
        mut input,
        mut prompt,
        timeout,
    } = operator;

    write!(prompt, "{CONFIRM_QUESTION}")?;
    prompt.flush()?;

    let (tx, rx) = oneshot::channel();
    thread::Builder::new()
        .name("operator-answer".to_string())
        .spawn(move || {
            let mut answer = String::new();
            let result = input.read_line(&mut answer).map(|_| answer);
            let _ = tx.send(result);
        })?;

    let received = match timeout {
        Some(limit) => match tokio::time::timeout(limit, rx).await {
            Ok(received) => received,
            Err(_) => {
                tracing::warn!(secs = limit.as_secs(), "no answer before timeout");
                writeln!(prompt)?;
                return Ok(false);
            }
        },
        None => rx.await,
    };

    let answer = match received {
        Ok(result) => result?,
        Err(_) => String::new(),
    };
    if answer.is_empty() {
        tracing::debug!("input closed before an answer was given");
    }
    Ok(is_affirmative(&answer))
}
