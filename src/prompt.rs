//! Review prompt construction
//!
//! The staged diff is inserted verbatim, exactly once, into a fixed
//! instruction template. Nothing else is interpolated.

use crate::error::Result;
use crate::validation::validate_prompt_size;

/// Placeholder replaced by the staged diff
pub const DIFF_PLACEHOLDER: &str = "{{GIT_DIFF}}";

/// Fixed review instructions sent to Claude
pub const REVIEW_TEMPLATE: &str = "\
You are a code review assistant specializing in identifying security vulnerabilities and code quality issues in git diffs. Your task is to analyze the following git diff and provide a detailed report on any potential security issues or other significant problems introduced by the code changes.

Here is the git diff to analyze:

<git_diff>
{{GIT_DIFF}}
</git_diff>

Please follow these steps to analyze the git diff:

1. Security Analysis:
  - Look for potential security vulnerabilities introduced by the changes, such as:
    a) Injection flaws (SQL injection, command injection, etc.)
    b) Authentication and authorization issues
    c) Sensitive data exposure
    d) Cross-site scripting (XSS) vulnerabilities
    e) Insecure cryptographic practices
    f) Potential for privilege escalation
  - Pay special attention to changes in input validation, data handling, and authentication mechanisms.

2. Code Quality Analysis:
  - Identify any issues that could impact the overall quality and maintainability of the code, such as:
    a) Introduction of code smells or anti-patterns
    b) Violations of SOLID principles or other best practices
    c) Potential performance issues
    d) Inconsistencies in coding style or naming conventions
    e) Lack of proper error handling or logging
    f) Duplication of code or logic

3. Reporting Format:
  For each issue found, provide the following information in your report:
  <issue>
  <type>Security/Code Quality</type>
  <severity>High/Medium/Low</severity>
  <description>Detailed description of the issue</description>
  <location>File name and line number(s) where the issue occurs</location>
  <recommendation>Suggested fix or mitigation strategy</recommendation>
  </issue>

4. Summary:
  After listing all individual issues, provide a brief summary of the overall impact of the changes, including:
  - The number of security issues found (categorized by severity)
  - The number of code quality issues found (categorized by severity)
  - An assessment of the overall risk introduced by these changes
  - Any positive changes or improvements noticed in the diff

Please begin your analysis now and present your findings using the specified format. If no issues are found, state that explicitly in your report.
The output should be a simple conclusion if these changes should be commited or not, the full report should not be output
";

/// Build the review prompt for a staged diff
///
/// # Arguments
///
/// * `diff` - Staged diff, embedded verbatim in place of the placeholder
/// * `max_size` - Largest accepted prompt in bytes
///
/// # Returns
///
/// * `Result<String>` - The template with the diff substituted once
///
/// # Errors
///
/// * The assembled prompt would exceed `max_size` bytes
///
/// # Example
///
/// ```
/// use claude_review::prompt::build_prompt;
///
/// let diff = "diff --git a/app.rs b/app.rs\n+let x = 1;";
/// let prompt = build_prompt(diff, 1_000_000).unwrap();
/// assert!(prompt.contains("<git_diff>\ndiff --git a/app.rs b/app.rs\n+let x = 1;\n</git_diff>"));
/// ```
pub fn build_prompt(diff: &str, max_size: usize) -> Result<String> {
    validate_prompt_size(REVIEW_TEMPLATE, diff, max_size)?;

    // replacen scans the template only, so placeholder text inside the diff stays untouched
    Ok(REVIEW_TEMPLATE.replacen(DIFF_PLACEHOLDER, diff, 1))
}
