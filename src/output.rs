//! Output structures for JSON formatting
//!
//! With `--json` the hook prints a single [`ReviewReport`] instead of the
//! human readable transcript.

use serde::Serialize;

use crate::gate::{Decision, Verdict};
use crate::hook::Outcome;

/// Whether a review took place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    NothingStaged,
    Reviewed,
}

/// Machine readable summary of a hook run
///
/// # Example
///
/// ```
/// use claude_review::hook::Outcome;
/// use claude_review::output::ReviewReport;
///
/// let report = ReviewReport::from(&Outcome::NothingStaged);
/// let json = serde_json::to_string(&report).unwrap();
/// assert_eq!(json, r#"{"status":"nothing_staged","exit_code":0}"#);
/// ```
#[derive(Debug, Serialize)]
pub struct ReviewReport {
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub exit_code: u8,
}

impl From<&Outcome> for ReviewReport {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::NothingStaged => Self {
                status: ReviewStatus::NothingStaged,
                verdict: None,
                decision: None,
                feedback: None,
                exit_code: outcome.exit_code(),
            },
            Outcome::Reviewed {
                feedback,
                verdict,
                decision,
            } => Self {
                status: ReviewStatus::Reviewed,
                verdict: Some(*verdict),
                decision: Some(*decision),
                feedback: Some(feedback.clone()),
                exit_code: outcome.exit_code(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialize_approved() {
        // Arrange
        let outcome = Outcome::Reviewed {
            feedback: "no issues found".to_string(),
            verdict: Verdict::Clear,
            decision: Decision::Approved,
        };

        // Act
        let json = serde_json::to_string(&ReviewReport::from(&outcome)).unwrap();

        // Assert
        assert_eq!(
            json,
            r#"{"status":"reviewed","verdict":"clear","decision":"approved","feedback":"no issues found","exit_code":0}"#
        );
    }

    #[test]
    fn test_report_serialize_blocked() {
        // Arrange - multiline feedback with quotes
        let outcome = Outcome::Reviewed {
            feedback: "[CRITICAL] \"eval\" on user input\nDo not commit.".to_string(),
            verdict: Verdict::Critical,
            decision: Decision::Blocked,
        };

        // Act
        let json = serde_json::to_string(&ReviewReport::from(&outcome)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        // Assert
        assert_eq!(parsed["verdict"], "critical");
        assert_eq!(parsed["decision"], "blocked");
        assert_eq!(parsed["exit_code"], 1);
        assert_eq!(
            parsed["feedback"],
            "[CRITICAL] \"eval\" on user input\nDo not commit."
        );
    }
}
