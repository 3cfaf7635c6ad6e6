//! Claude Review - Git pre-commit security and quality review
//!
//! This library sends the staged git diff to Claude for review and decides
//! whether the commit may proceed.
//!
//! # Modules
//!
//! - [`config`] - Credential and tunables loading
//! - [`git`] - Staged file and diff queries
//! - [`prompt`] - Review prompt template
//! - [`validation`] - Prompt size limits
//! - [`claude`] - Messages API client
//! - [`gate`] - Critical marker detection and operator confirmation
//! - [`terminal`] - Choosing where the operator is asked
//! - [`hook`] - The pipeline tying the above together
//! - [`output`] - JSON report for `--json`
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use claude_review::{
//!     claude::ClaudeClient,
//!     config::{Settings, UnattendedPolicy},
//!     gate::Gate,
//!     git::GitRepo,
//!     hook, terminal,
//! };
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let settings = Settings::load(Path::new(".git/hooks/.env"), None)?;
//! let repo = GitRepo::discover()?;
//! let client = ClaudeClient::new(&settings)?;
//! let confirmation = terminal::confirmation(false, None, UnattendedPolicy::Block);
//! let gate = Gate::new(confirmation, false);
//! let outcome = hook::run(&settings, &repo, &client, gate, &mut std::io::stdout()).await?;
//! std::process::exit(outcome.exit_code().into());
//! # }
//! ```

pub mod claude;
pub mod config;
pub mod error;
pub mod gate;
pub mod git;
pub mod hook;
pub mod output;
pub mod prompt;
pub mod terminal;
pub mod validation;

pub use error::{Result, ReviewError};
