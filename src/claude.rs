//! Claude Messages API client
//!
//! Sends a single review request per invocation and turns the reply into
//! plain feedback text. There is no retry: any failure aborts the hook.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::config::Settings;
use crate::error::{Result, ReviewError};

/// Path of the Messages endpoint, relative to the API base URL
pub const MESSAGES_PATH: &str = "/v1/messages";

/// Something that can review a prompt and return feedback text
pub trait Reviewer {
    /// Send the prompt and return the feedback text
    fn review(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    /// Model identifier used for the review
    fn model(&self) -> &str;

    /// Endpoint the request is sent to
    fn endpoint(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Anthropic Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    anthropic_version: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    /// Build a client from validated settings
    ///
    /// # Errors
    ///
    /// * The HTTP client cannot be initialised (TLS backend failure)
    pub fn new(settings: &Settings) -> Result<Self> {
        let review = &settings.review;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(review.connect_timeout_secs))
            .timeout(Duration::from_secs(review.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", review.api_url.trim_end_matches('/'), MESSAGES_PATH),
            api_key: settings.api_key().to_string(),
            anthropic_version: review.anthropic_version.clone(),
            model: review.model.clone(),
            max_tokens: review.max_tokens,
        })
    }
}

impl Reviewer for ClaudeClient {
    async fn review(&self, prompt: &str) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        tracing::info!(endpoint = %self.endpoint, model = %self.model, "sending review request");
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.anthropic_version)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(%status, bytes = body.len(), "review response received");

        if !status.is_success() {
            return Err(ReviewError::Api {
                status: status.as_u16(),
                message: api_error_message(&body),
            });
        }

        extract_feedback(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Pull the feedback text out of a Messages API response body
///
/// Only the first content block is used.
///
/// # Errors
///
/// * `ResponseFormat` when the body is not JSON or `content` is missing or empty
/// * `EmptyFeedback` when the first block carries no text
///
/// # Example
///
/// ```
/// use claude_review::claude::extract_feedback;
///
/// let body = r#"{"content":[{"type":"text","text":"no issues found"}]}"#;
/// assert_eq!(extract_feedback(body).unwrap(), "no issues found");
/// ```
pub fn extract_feedback(body: &str) -> Result<String> {
    let response: MessagesResponse = serde_json::from_str(body).map_err(|e| {
        ReviewError::ResponseFormat(format!("Failed to parse API response: {e}"))
    })?;

    let first = response
        .content
        .and_then(|blocks| blocks.into_iter().next())
        .ok_or_else(|| {
            ReviewError::ResponseFormat("Invalid API response structure".to_string())
        })?;

    match first.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ReviewError::EmptyFeedback),
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}
