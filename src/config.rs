//! Configuration management for the review hook
//!
//! Two files are read once at startup, both located beside the hook
//! executable unless overridden on the command line:
//!
//! - `.env` holds `KEY=VALUE` lines and must contain `CLAUDE_API_KEY`
//! - `claude-review.toml` is optional and holds tunables for the review

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ReviewError};

/// Name of the credential key in the settings file
pub const API_KEY_VAR: &str = "CLAUDE_API_KEY";

/// Default settings file name
pub const ENV_FILE_NAME: &str = ".env";

/// Default tunables file name
pub const CONFIG_FILE_NAME: &str = "claude-review.toml";

/// What to do with a critical finding when nobody can answer the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnattendedPolicy {
    /// Reject the commit
    Block,
    /// Let the commit through
    Allow,
}

/// Review tunables
///
/// # Example TOML
///
/// ```toml
/// model = "claude-3-opus-20240229"
/// max_tokens = 4096
///
/// # Seconds to wait for the operator's answer, 0 waits forever
/// prompt_timeout_secs = 120
///
/// # "block" or "allow" when stdin is not a terminal
/// unattended = "block"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReviewConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Scheme and host of the Messages API
    pub api_url: String,
    /// Value of the `anthropic-version` header
    pub anthropic_version: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Maximum prompt size in bytes (template plus diff)
    pub max_prompt_size: usize,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub prompt_timeout_secs: u64,
    pub unattended: UnattendedPolicy,
    /// Let an explicit "y" answer produce a zero exit status
    pub honor_confirmation: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-opus-20240229".to_string(),
            api_url: "https://api.anthropic.com".to_string(),
            anthropic_version: "2023-06-01".to_string(),
            max_tokens: 4096,
            max_prompt_size: 1_000_000,
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            prompt_timeout_secs: 300,
            unattended: UnattendedPolicy::Block,
            honor_confirmation: false,
        }
    }
}

impl ReviewConfig {
    /// Parse tunables from TOML text and validate them
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ReviewConfig = toml::from_str(content).map_err(|e| {
            ReviewError::Configuration(format!("Failed to parse config file as TOML: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ReviewError::Configuration(
                "'model' cannot be empty or whitespace-only".to_string(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(ReviewError::Configuration(
                "'api_url' cannot be empty or whitespace-only".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(ReviewError::Configuration(
                "'max_tokens' must be greater than zero".to_string(),
            ));
        }
        for (name, secs) in [
            ("request_timeout_secs", self.request_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ReviewError::Configuration(format!(
                    "'{name}' must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Configuration assembled once at startup and passed to every collaborator
#[derive(Clone)]
pub struct Settings {
    api_key: String,
    pub review: ReviewConfig,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("review", &self.review)
            .finish()
    }
}

impl Settings {
    /// Build settings from an already validated credential
    ///
    /// Returns a configuration error if the key is empty or whitespace-only.
    pub fn new(api_key: impl Into<String>, review: ReviewConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(missing_key());
        }
        Ok(Self { api_key, review })
    }

    /// Load the credential and, when given, the tunables file
    ///
    /// # Errors
    ///
    /// * The settings file cannot be read
    /// * `CLAUDE_API_KEY` is absent or empty
    /// * The tunables file cannot be read, is not valid TOML, or fails validation
    pub fn load(env_file: &Path, config_file: Option<&Path>) -> Result<Self> {
        let api_key = load_api_key(env_file)?;
        let review = match config_file {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    ReviewError::Configuration(format!(
                        "Failed to read config file {}: {e}",
                        path.display()
                    ))
                })?;
                ReviewConfig::from_toml(&content)?
            }
            None => ReviewConfig::default(),
        };
        tracing::debug!(model = %review.model, api_url = %review.api_url, "settings loaded");
        Self::new(api_key, review)
    }

    /// Credential sent in the `x-api-key` header
    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Parse `KEY=VALUE` lines into a map
///
/// Keys and values are trimmed. Lines without `=`, with an empty key or an
/// empty value are skipped. Values keep any further `=` characters.
///
/// # Example
///
/// ```
/// use claude_review::config::parse_env;
///
/// let vars = parse_env("  CLAUDE_API_KEY = sk-123  \nbroken line\nEMPTY=\n");
/// assert_eq!(vars.get("CLAUDE_API_KEY").map(String::as_str), Some("sk-123"));
/// assert_eq!(vars.len(), 1);
/// ```
pub fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once('=')?;
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Read the settings file and return the API credential
///
/// # Arguments
///
/// * `env_file` - Path to the `KEY=VALUE` settings file
///
/// # Returns
///
/// * `Result<String>` - The trimmed value of `CLAUDE_API_KEY`
///
/// # Errors
///
/// * The file cannot be read
/// * The key is absent or its value is empty
pub fn load_api_key(env_file: &Path) -> Result<String> {
    let content = fs::read_to_string(env_file).map_err(|e| {
        ReviewError::Configuration(format!(
            "Error reading {}: {e}",
            env_file.display()
        ))
    })?;

    parse_env(&content).remove(API_KEY_VAR).ok_or_else(missing_key)
}

/// Directory containing the running hook executable
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| {
        ReviewError::Configuration(format!("Cannot locate the hook executable: {e}"))
    })?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        ReviewError::Configuration(format!("{} has no parent directory", exe.display()))
    })
}

fn missing_key() -> ReviewError {
    ReviewError::Configuration(format!("{API_KEY_VAR} not found in {ENV_FILE_NAME} file"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_trims_keys_and_values() {
        // Arrange
        let content = "  CLAUDE_API_KEY   =   sk-ant-123  \n\tOTHER=value\t";

        // Act
        let vars = parse_env(content);

        // Assert
        assert_eq!(vars["CLAUDE_API_KEY"], "sk-ant-123");
        assert_eq!(vars["OTHER"], "value");
    }

    #[test]
    fn test_parse_env_skips_malformed_lines() {
        // Arrange - no '=', empty value, empty key, blank line
        let content = "no equals sign\nEMPTY=\n   =orphan\n\nGOOD=1\nSPACES=   \n";

        // Act
        let vars = parse_env(content);

        // Assert - only the well-formed line survives
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["GOOD"], "1");
    }

    #[test]
    fn test_parse_env_keeps_equals_in_value() {
        let vars = parse_env("TOKEN=abc==\n");
        assert_eq!(vars["TOKEN"], "abc==");
    }

    #[test]
    fn test_parse_env_handles_crlf() {
        let vars = parse_env("CLAUDE_API_KEY=sk\r\nX=y\r\n");
        assert_eq!(vars["CLAUDE_API_KEY"], "sk");
        assert_eq!(vars["X"], "y");
    }

    #[test]
    fn test_load_api_key_present() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENV_FILE_NAME);
        fs::write(&path, "# comment\nCLAUDE_API_KEY=sk-ant-test\n").unwrap();

        // Act
        let key = load_api_key(&path).unwrap();

        // Assert
        assert_eq!(key, "sk-ant-test");
    }

    #[test]
    fn test_load_api_key_missing_key() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENV_FILE_NAME);
        fs::write(&path, "OTHER_KEY=value\n").unwrap();

        // Act
        let result = load_api_key(&path);

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, ReviewError::Configuration(_)));
        assert!(err.to_string().contains("CLAUDE_API_KEY not found"));
    }

    #[test]
    fn test_load_api_key_empty_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENV_FILE_NAME);
        fs::write(&path, "CLAUDE_API_KEY=   \n").unwrap();

        let result = load_api_key(&path);

        assert!(matches!(result, Err(ReviewError::Configuration(_))));
    }

    #[test]
    fn test_load_api_key_unreadable_file() {
        // Arrange - file does not exist
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.env");

        // Act
        let result = load_api_key(&path);

        // Assert
        let err = result.unwrap_err();
        assert!(matches!(err, ReviewError::Configuration(_)));
        assert!(err.to_string().contains("missing.env"));
    }

    #[test]
    fn test_review_config_defaults() {
        // Act - empty TOML document
        let config = ReviewConfig::from_toml("").unwrap();

        // Assert
        assert_eq!(config.model, "claude-3-opus-20240229");
        assert_eq!(config.api_url, "https://api.anthropic.com");
        assert_eq!(config.anthropic_version, "2023-06-01");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.max_prompt_size, 1_000_000);
        assert_eq!(config.unattended, UnattendedPolicy::Block);
        assert!(!config.honor_confirmation);
    }

    #[test]
    fn test_review_config_overrides() {
        // Arrange
        let toml_str = r#"
model = "claude-3-5-sonnet-latest"
max_tokens = 1024
prompt_timeout_secs = 0
unattended = "allow"
honor_confirmation = true
"#;

        // Act
        let config = ReviewConfig::from_toml(toml_str).unwrap();

        // Assert - overridden fields change, the rest keep defaults
        assert_eq!(config.model, "claude-3-5-sonnet-latest");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.prompt_timeout_secs, 0);
        assert_eq!(config.unattended, UnattendedPolicy::Allow);
        assert!(config.honor_confirmation);
        assert_eq!(config.api_url, "https://api.anthropic.com");
    }

    #[test]
    fn test_review_config_invalid_toml() {
        let result = ReviewConfig::from_toml("model = \"unclosed quote\n");
        assert!(matches!(result, Err(ReviewError::Configuration(_))));
    }

    #[test]
    fn test_review_config_unknown_field() {
        let result = ReviewConfig::from_toml("modle = \"typo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_review_config_rejects_blank_model() {
        let err = ReviewConfig::from_toml("model = \"   \"\n").unwrap_err();
        assert!(err.to_string().contains("'model' cannot be empty"));
    }

    #[test]
    fn test_review_config_rejects_zero_max_tokens() {
        let err = ReviewConfig::from_toml("max_tokens = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_tokens"));
    }

    #[test]
    fn test_review_config_rejects_zero_timeouts() {
        // Arrange
        for field in ["request_timeout_secs", "connect_timeout_secs"] {
            let content = format!("{field} = 0\n");

            // Act
            let err = ReviewConfig::from_toml(&content).unwrap_err();

            // Assert
            assert!(matches!(err, ReviewError::Configuration(_)));
            assert!(err.to_string().contains(&format!("'{field}' must be greater than zero")));
        }
    }

    #[test]
    fn test_review_config_zero_prompt_timeout_waits_forever() {
        let config = ReviewConfig::from_toml("prompt_timeout_secs = 0\n").unwrap();

        assert_eq!(config.prompt_timeout_secs, 0);
    }

    #[test]
    fn test_settings_load_with_config_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join(ENV_FILE_NAME);
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&env_path, "CLAUDE_API_KEY=sk-ant-abc\n").unwrap();
        fs::write(&config_path, "max_tokens = 2048\n").unwrap();

        // Act
        let settings = Settings::load(&env_path, Some(&config_path)).unwrap();

        // Assert
        assert_eq!(settings.api_key(), "sk-ant-abc");
        assert_eq!(settings.review.max_tokens, 2048);
    }

    #[test]
    fn test_settings_load_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_path = dir.path().join(ENV_FILE_NAME);
        fs::write(&env_path, "CLAUDE_API_KEY=sk-ant-abc\n").unwrap();

        let result = Settings::load(&env_path, Some(&dir.path().join("absent.toml")));

        assert!(matches!(result, Err(ReviewError::Configuration(_))));
    }

    #[test]
    fn test_settings_debug_redacts_key() {
        let settings = Settings::new("sk-ant-secret", ReviewConfig::default()).unwrap();
        assert!(!format!("{settings:?}").contains("sk-ant-secret"));
    }

    #[test]
    fn test_settings_new_rejects_blank_key() {
        let result = Settings::new(" ", ReviewConfig::default());
        assert!(matches!(result, Err(ReviewError::Configuration(_))));
    }
}
