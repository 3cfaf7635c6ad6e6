//! Git queries for the review hook
//!
//! All queries run against the repository top level so the hook behaves
//! the same when git invokes it from a subdirectory.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ReviewError};

/// Source of the staged changes to review
pub trait StagedChanges {
    /// Names of staged files, newline separated. Empty means nothing is staged.
    fn staged_files(&self) -> Result<String>;

    /// Unified diff of the staged changes
    fn staged_diff(&self) -> Result<String>;
}

/// A git checkout queried through the `git` executable
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Locate the repository enclosing the current working directory
    pub fn discover() -> Result<Self> {
        Self::open(Path::new("."))
    }

    /// Locate the repository enclosing `dir`
    ///
    /// # Errors
    ///
    /// * Git is not installed or not in PATH
    /// * `dir` is not inside a git checkout
    pub fn open(dir: &Path) -> Result<Self> {
        let root = run_git(dir, &["rev-parse", "--show-toplevel"])?;
        let root = PathBuf::from(root.trim());
        tracing::debug!(root = %root.display(), "found git root");
        Ok(Self { root })
    }

    /// Top level directory of the checkout
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StagedChanges for GitRepo {
    fn staged_files(&self) -> Result<String> {
        Ok(run_git(&self.root, &["diff", "--cached", "--name-only"])?
            .trim()
            .to_string())
    }

    fn staged_diff(&self) -> Result<String> {
        run_git(&self.root, &["diff", "--cached"])
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Result<String> {
    let command = args.join(" ");
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| ReviewError::RepositoryQuery {
            command: command.clone(),
            message: format!("{e}. Make sure git is installed and in PATH"),
        })?;

    if !output.status.success() {
        return Err(ReviewError::RepositoryQuery {
            command,
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// Queries against real checkouts are covered in tests/git_repo.rs.
