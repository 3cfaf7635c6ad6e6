//! Error types for the review hook
//!
//! Every variant is fatal: the binary prints the message and exits with
//! status 1. Nothing is retried or downgraded to a warning.

use std::io;

/// Errors raised while reviewing staged changes
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Settings file unreadable, credential missing, or invalid tunables
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A `git` query could not be run or exited non-zero
    #[error("Git command `git {command}` failed: {message}")]
    RepositoryQuery { command: String, message: String },

    /// The review API could not be reached
    #[error("Failed to reach review API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The review API answered with a non-success status
    #[error("Review API returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not JSON or lacked a usable `content` array
    #[error("Invalid API response: {0}")]
    ResponseFormat(String),

    /// The response parsed but carried no feedback text
    #[error("No feedback received from Claude")]
    EmptyFeedback,

    #[error(
        "Prompt size ({size} bytes) exceeds maximum allowed size ({max} bytes). \
         Consider reducing the size of staged changes or splitting into multiple commits."
    )]
    PromptTooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for review operations
pub type Result<T> = std::result::Result<T, ReviewError>;
