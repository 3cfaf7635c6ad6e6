//! Input validation for review prompts
//!
//! Sizes are checked before the prompt is assembled so a huge staged diff
//! never gets copied into a second allocation.

use crate::error::{Result, ReviewError};
use crate::prompt::DIFF_PLACEHOLDER;

/// Calculate the final prompt size without allocating it
///
/// The diff replaces the single placeholder in the template.
///
/// # Example
///
/// ```
/// use claude_review::validation::calculate_prompt_size;
///
/// let template = "Review:\n{{GIT_DIFF}}\n";
/// let diff = "+added line";
///
/// assert_eq!(calculate_prompt_size(template, diff), "Review:\n+added line\n".len());
/// ```
pub fn calculate_prompt_size(template: &str, diff: &str) -> usize {
    let placeholder = if template.contains(DIFF_PLACEHOLDER) {
        DIFF_PLACEHOLDER.len()
    } else {
        0
    };
    template.len() - placeholder + diff.len()
}

/// Validate that the assembled prompt stays within `max_size` bytes
///
/// # Errors
///
/// * Total size exceeds `max_size`
pub fn validate_prompt_size(template: &str, diff: &str, max_size: usize) -> Result<()> {
    let size = calculate_prompt_size(template, diff);

    if size > max_size {
        return Err(ReviewError::PromptTooLarge {
            size,
            max: max_size,
        });
    }

    Ok(())
}
