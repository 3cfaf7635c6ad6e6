//! The pre-commit review pipeline
//!
//! Staged files, diff, prompt, review, gate. Runs once and stops at the
//! first error.

use std::io::{BufRead, Write};

use crate::claude::Reviewer;
use crate::config::Settings;
use crate::error::Result;
use crate::gate::{Decision, Gate, Verdict, assess};
use crate::git::StagedChanges;
use crate::prompt::build_prompt;

/// Result of a completed hook run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing staged, no review was requested
    NothingStaged,
    /// Claude reviewed the diff and the gate decided
    Reviewed {
        feedback: String,
        verdict: Verdict,
        decision: Decision,
    },
}

impl Outcome {
    /// Process exit status for this outcome
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::NothingStaged => 0,
            Outcome::Reviewed { decision, .. } => decision.exit_code(),
        }
    }
}

/// Prompt length in UTF-16 code units
fn prompt_length(prompt: &str) -> usize {
    prompt.encode_utf16().count()
}

/// Review the staged changes of `repo` and gate the commit
///
/// Human readable progress is written to `out`.
///
/// # Arguments
///
/// * `settings` - Loaded configuration
/// * `repo` - Source of the staged file list and diff
/// * `reviewer` - Client that sends the prompt, called at most once
/// * `gate` - Decision gate, consumed by the run
/// * `out` - Destination of the transcript
///
/// # Returns
///
/// * `Result<Outcome>` - `NothingStaged`, or the feedback with the gate's decision
///
/// # Errors
///
/// * A git query fails
/// * The prompt exceeds the configured size
/// * The review request fails or returns no usable feedback
/// * Writing to `out` or reading the operator's answer fails
pub async fn run<S, R, I, P, W>(
    settings: &Settings,
    repo: &S,
    reviewer: &R,
    gate: Gate<I, P>,
    out: &mut W,
) -> Result<Outcome>
where
    S: StagedChanges,
    R: Reviewer,
    I: BufRead + Send + 'static,
    P: Write,
    W: Write,
{
    let staged = repo.staged_files()?;
    if staged.is_empty() {
        tracing::info!("no staged files, skipping review");
        return Ok(Outcome::NothingStaged);
    }
    tracing::debug!(files = staged.lines().count(), "staged files found");

    let diff = repo.staged_diff()?;
    let prompt = build_prompt(&diff, settings.review.max_prompt_size)?;

    writeln!(out, "\nSanity checking diff with Claude:")?;
    writeln!(out, "Model: {}", reviewer.model())?;
    writeln!(out, "Prompt length: {} characters", prompt_length(&prompt))?;
    writeln!(out, "API Endpoint: {}", reviewer.endpoint())?;
    writeln!(out, "----------------------------------------")?;
    out.flush()?;

    let feedback = reviewer.review(&prompt).await?;

    writeln!(out, "\nClaude's Review:")?;
    writeln!(out, "{feedback}")?;

    let verdict = assess(&feedback);
    let decision = gate.decide(&feedback, out).await?;

    Ok(Outcome::Reviewed {
        feedback,
        verdict,
        decision,
    })
}
